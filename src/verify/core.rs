// src/verify/core.rs

//! Pure verification state machine.
//!
//! The core tracks the current candidate, the accepted harness, and the
//! best known candidate (the last one that at least compiled against the
//! harness). Budget accounting charges one round per diagnosis request;
//! waveform extraction between a report and its diagnosis is free.

use tracing::{debug, warn};

use crate::reason::{DebugAction, HarnessVerdict};
use crate::toolkit::{
    incomplete_module_message, module_delimiters_present, SimOutcome, TraceRequest,
};

/// Events the driver feeds back into the core.
#[derive(Debug, Clone)]
pub enum VerifyEvent {
    HarnessReady(String),
    ApprovalReturned(HarnessVerdict),
    SimFinished(SimOutcome),
    ActionReturned(DebugAction),
    TraceReady(String),
}

/// Commands the core asks the driver to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyCommand {
    /// Run the harness draft-and-review sub-loop.
    SynthesizeHarness { feedback: Option<String> },
    /// Ask the operator to sign off on a reviewed harness.
    RequestApproval { harness: String },
    /// Install the accepted harness into the toolchain. No reply event.
    InstallHarness { harness: String },
    RunSimulation { code: String },
    RequestDiagnosis {
        code: String,
        harness: String,
        report: String,
        trace: Option<String>,
    },
    ExtractTrace(TraceRequest),
    Finish(VerifyOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The candidate simulated with zero mismatches.
    Pass,
    /// The debug budget ran out; the best known candidate stands.
    Fail,
}

#[derive(Debug, Clone)]
enum State {
    AwaitingHarness,
    AwaitingApproval { harness: String },
    Simulating,
    Diagnosing,
    Tracing,
    Terminal(VerifyOutcome),
}

#[derive(Debug)]
pub struct VerifyCore {
    code: String,
    harness: Option<String>,
    best_code: Option<String>,
    last_report: String,
    state: State,
    diagnoses: u32,
    budget: u32,
}

impl VerifyCore {
    pub fn new(code: String, budget: u32) -> Self {
        Self {
            code,
            harness: None,
            best_code: None,
            last_report: String::new(),
            state: State::AwaitingHarness,
            diagnoses: 0,
            budget,
        }
    }

    pub fn diagnoses(&self) -> u32 {
        self.diagnoses
    }

    pub fn harness(&self) -> Option<&str> {
        self.harness.as_deref()
    }

    /// The candidate to keep if the loop fails: the last one that
    /// compiled, falling back to the current one.
    pub fn best_known_code(&self) -> &str {
        self.best_code.as_deref().unwrap_or(&self.code)
    }

    pub fn current_code(&self) -> &str {
        &self.code
    }

    /// Kick off the loop. A pre-accepted harness (resumed run) skips
    /// straight to simulation.
    pub fn start(&mut self, existing_harness: Option<String>) -> Vec<VerifyCommand> {
        match existing_harness {
            Some(harness) => {
                self.harness = Some(harness.clone());
                self.state = State::Simulating;
                vec![
                    VerifyCommand::InstallHarness { harness },
                    VerifyCommand::RunSimulation {
                        code: self.code.clone(),
                    },
                ]
            }
            None => {
                self.state = State::AwaitingHarness;
                vec![VerifyCommand::SynthesizeHarness { feedback: None }]
            }
        }
    }

    /// Handle one event, returning the next commands.
    pub fn step(&mut self, event: VerifyEvent) -> Vec<VerifyCommand> {
        let state = std::mem::replace(&mut self.state, State::Terminal(VerifyOutcome::Fail));
        match (state, event) {
            (State::AwaitingHarness, VerifyEvent::HarnessReady(harness)) => {
                self.state = State::AwaitingApproval {
                    harness: harness.clone(),
                };
                vec![VerifyCommand::RequestApproval { harness }]
            }
            (State::AwaitingApproval { harness }, VerifyEvent::ApprovalReturned(verdict)) => {
                match verdict {
                    HarnessVerdict::Accept => {
                        self.harness = Some(harness.clone());
                        self.state = State::Simulating;
                        vec![
                            VerifyCommand::InstallHarness { harness },
                            VerifyCommand::RunSimulation {
                                code: self.code.clone(),
                            },
                        ]
                    }
                    HarnessVerdict::Reject(reason) => {
                        debug!(%reason, "operator rejected harness");
                        self.state = State::AwaitingHarness;
                        vec![VerifyCommand::SynthesizeHarness {
                            feedback: Some(reason),
                        }]
                    }
                }
            }
            (State::Simulating, VerifyEvent::SimFinished(outcome)) => {
                if outcome.functional_pass {
                    return self.finish(VerifyOutcome::Pass);
                }
                if outcome.compiled {
                    self.best_code = Some(self.code.clone());
                }
                self.request_diagnosis(outcome.report, None)
            }
            (State::Diagnosing, VerifyEvent::ActionReturned(action)) => match action {
                DebugAction::ReviseCode(code) => {
                    if !module_delimiters_present(&code) {
                        debug!("revision rejected structurally, no simulator invocation");
                        let report = incomplete_module_message(&code);
                        self.code = code;
                        return self.request_diagnosis(report, None);
                    }
                    self.code = code.clone();
                    self.state = State::Simulating;
                    vec![VerifyCommand::RunSimulation { code }]
                }
                DebugAction::InspectWaveform(req) => {
                    self.state = State::Tracing;
                    vec![VerifyCommand::ExtractTrace(req)]
                }
            },
            (State::Tracing, VerifyEvent::TraceReady(table)) => {
                let report = self.last_report.clone();
                self.request_diagnosis(report, Some(table))
            }
            (State::Terminal(outcome), _) => {
                warn!("event received after loop termination, ignoring");
                self.state = State::Terminal(outcome);
                vec![VerifyCommand::Finish(outcome)]
            }
            (state, event) => {
                warn!(?state, ?event, "event does not match loop state, ignoring");
                self.state = state;
                Vec::new()
            }
        }
    }

    /// Charge one round and emit a diagnosis request, or finish failed
    /// when the budget is gone.
    fn request_diagnosis(&mut self, report: String, trace: Option<String>) -> Vec<VerifyCommand> {
        if self.diagnoses >= self.budget {
            warn!(budget = self.budget, "debug budget exhausted");
            return self.finish(VerifyOutcome::Fail);
        }
        let Some(harness) = self.harness.clone() else {
            warn!("diagnosis requested without an accepted harness");
            return self.finish(VerifyOutcome::Fail);
        };
        self.diagnoses += 1;
        self.last_report = report.clone();
        self.state = State::Diagnosing;
        vec![VerifyCommand::RequestDiagnosis {
            code: self.code.clone(),
            harness,
            report,
            trace,
        }]
    }

    fn finish(&mut self, outcome: VerifyOutcome) -> Vec<VerifyCommand> {
        self.state = State::Terminal(outcome);
        vec![VerifyCommand::Finish(outcome)]
    }
}
