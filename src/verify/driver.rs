// src/verify/driver.rs

//! Async shell around [`VerifyCore`].

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::errors::Result;
use crate::reason::{DiagnoseRequest, Operator, Reasoner};
use crate::toolkit::Toolchain;
use crate::verify::harness::synthesize_harness;
use crate::verify::{VerifyCommand, VerifyCore, VerifyEvent, VerifyOutcome};

/// Review attempts per harness candidate before it goes to the operator
/// as-is.
const HARNESS_REVIEW_ATTEMPTS: u32 = 5;

/// Final state of a verification run.
#[derive(Debug, Clone)]
pub struct VerifyReport {
    pub outcome: VerifyOutcome,
    /// The passing candidate, or the best known one on failure.
    pub code: String,
    pub harness: Option<String>,
    pub diagnoses: u32,
}

/// Drive the verification loop over a synthesized candidate.
///
/// `existing_harness` short-circuits harness synthesis on resumed runs.
#[allow(clippy::too_many_arguments)]
pub async fn run_verification(
    reasoner: &dyn Reasoner,
    operator: &dyn Operator,
    toolchain: &dyn Toolchain,
    spec: &str,
    interface: Option<&str>,
    code: String,
    existing_harness: Option<String>,
    budget: u32,
) -> Result<VerifyReport> {
    info!(budget, resumed_harness = existing_harness.is_some(), "starting verification loop");
    let mut core = VerifyCore::new(code, budget);
    let mut pending: VecDeque<VerifyCommand> = core.start(existing_harness).into();

    let outcome = loop {
        let Some(command) = pending.pop_front() else {
            break VerifyOutcome::Fail;
        };
        let event = match command {
            VerifyCommand::Finish(outcome) => break outcome,
            VerifyCommand::SynthesizeHarness { feedback } => {
                let harness = synthesize_harness(
                    reasoner,
                    toolchain,
                    spec,
                    interface,
                    feedback,
                    HARNESS_REVIEW_ATTEMPTS,
                )
                .await?;
                VerifyEvent::HarnessReady(harness)
            }
            VerifyCommand::RequestApproval { harness } => {
                let verdict = operator.approve_harness(&harness).await?;
                VerifyEvent::ApprovalReturned(verdict)
            }
            VerifyCommand::InstallHarness { harness } => {
                toolchain.install_harness(&harness).await?;
                continue;
            }
            VerifyCommand::RunSimulation { code } => {
                let outcome = toolchain.compile_and_run(&code).await?;
                debug!(
                    compiled = outcome.compiled,
                    pass = outcome.functional_pass,
                    "simulation finished"
                );
                VerifyEvent::SimFinished(outcome)
            }
            VerifyCommand::RequestDiagnosis {
                code,
                harness,
                report,
                trace,
            } => {
                let action = reasoner
                    .diagnose(&DiagnoseRequest {
                        code,
                        harness,
                        report,
                        trace,
                    })
                    .await?;
                VerifyEvent::ActionReturned(action)
            }
            VerifyCommand::ExtractTrace(req) => {
                let table = toolchain.trace(&req).await?;
                VerifyEvent::TraceReady(table)
            }
        };
        pending.extend(core.step(event));
    };

    let diagnoses = core.diagnoses();
    info!(?outcome, diagnoses, "verification loop finished");
    let code = match outcome {
        VerifyOutcome::Pass => core.current_code().to_string(),
        VerifyOutcome::Fail => core.best_known_code().to_string(),
    };
    Ok(VerifyReport {
        outcome,
        code,
        harness: core.harness().map(str::to_string),
        diagnoses,
    })
}
