// src/synth/driver.rs

//! Async shell around [`SynthCore`].
//!
//! The driver owns no policy: it executes each command against the
//! collaborator or the toolchain and feeds the result back into the core
//! as an event, until a `Finish` command arrives.

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::errors::Result;
use crate::reason::{DraftRequest, Reasoner, ReviewRequest};
use crate::synth::{SynthCommand, SynthCore, SynthEvent, SynthOutcome, WorkflowContext};
use crate::toolkit::Toolchain;

/// Final state of a synthesis run.
#[derive(Debug, Clone)]
pub struct SynthReport {
    pub outcome: SynthOutcome,
    pub code: String,
    pub interface: Option<String>,
    pub drafts: u32,
}

/// Drive the synthesis loop over the ordered task list.
pub async fn run_synthesis(
    reasoner: &dyn Reasoner,
    toolchain: &dyn Toolchain,
    tasks: Vec<String>,
    budget: u32,
) -> Result<SynthReport> {
    info!(tasks = tasks.len(), budget, "starting synthesis loop");
    let mut core = SynthCore::new(WorkflowContext::new(tasks), budget);
    let mut pending: VecDeque<SynthCommand> = core.start().into();

    let outcome = loop {
        let Some(command) = pending.pop_front() else {
            // The core went quiet without finishing; treat as incomplete.
            break SynthOutcome::Incomplete;
        };
        let event = match command {
            SynthCommand::Finish(outcome) => break outcome,
            SynthCommand::RequestDraft { task, feedback } => {
                debug!(%task, retry = feedback.is_some(), "requesting draft");
                let ctx = core.context();
                let request = DraftRequest {
                    task,
                    feedback,
                    current_code: ctx.current_code.clone(),
                    interface: ctx.inferred_interface.clone(),
                };
                let draft = reasoner.draft_design(&request).await?;
                SynthEvent::DraftProduced(draft)
            }
            SynthCommand::CompileCandidate { code } => {
                let outcome = toolchain.compile(&code).await?;
                debug!(pass = outcome.pass, "compile finished");
                SynthEvent::CompileFinished(outcome)
            }
            SynthCommand::RequestReview { task, code } => {
                let verdict = reasoner
                    .review_design(&ReviewRequest { task, code })
                    .await?;
                SynthEvent::ReviewReturned(verdict)
            }
        };
        pending.extend(core.step(event));
    };

    let drafts = core.drafts_requested();
    let ctx = core.into_context();
    info!(
        ?outcome,
        drafts,
        completed = ctx.completed_tasks.len(),
        "synthesis loop finished"
    );
    Ok(SynthReport {
        outcome,
        code: ctx.current_code,
        interface: ctx.inferred_interface,
        drafts,
    })
}
