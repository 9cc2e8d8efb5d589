// src/synth/core.rs

//! Pure synthesis state machine.
//!
//! `SynthCore` consumes [`SynthEvent`]s and produces [`SynthCommand`]s
//! for the driver. It owns the [`WorkflowContext`] and performs no IO:
//! structural rejection happens here (a draft without `endmodule` never
//! reaches the compiler), as does round accounting against the draft
//! budget.

use tracing::{debug, warn};

use crate::reason::ReviewVerdict;
use crate::synth::WorkflowContext;
use crate::toolkit::{incomplete_module_message, module_delimiters_present, CompileOutcome};

/// Events the driver feeds back into the core.
#[derive(Debug, Clone)]
pub enum SynthEvent {
    DraftProduced(String),
    CompileFinished(CompileOutcome),
    ReviewReturned(ReviewVerdict),
}

/// Commands the core asks the driver to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthCommand {
    RequestDraft {
        task: String,
        feedback: Option<String>,
    },
    CompileCandidate {
        code: String,
    },
    RequestReview {
        task: String,
        code: String,
    },
    Finish(SynthOutcome),
}

/// Terminal result of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthOutcome {
    /// Every task was drafted, compiled, and approved.
    Complete,
    /// The draft budget ran out first; the context still carries the
    /// code accumulated from approved tasks.
    Incomplete,
}

/// The active task rides in the state so every transition has it at
/// hand; `ctx.remaining_tasks` keeps it at the front until approval.
#[derive(Debug, Clone)]
enum State {
    Drafting { task: String },
    Compiling { task: String, draft: String },
    Reviewing { task: String, draft: String },
    Terminal(SynthOutcome),
}

#[derive(Debug)]
pub struct SynthCore {
    ctx: WorkflowContext,
    state: State,
    drafts_requested: u32,
    budget: u32,
}

impl SynthCore {
    pub fn new(ctx: WorkflowContext, budget: u32) -> Self {
        Self {
            ctx,
            state: State::Terminal(SynthOutcome::Incomplete),
            drafts_requested: 0,
            budget,
        }
    }

    pub fn context(&self) -> &WorkflowContext {
        &self.ctx
    }

    pub fn into_context(self) -> WorkflowContext {
        self.ctx
    }

    pub fn drafts_requested(&self) -> u32 {
        self.drafts_requested
    }

    /// Kick off the loop. An empty task queue completes immediately,
    /// with zero drafts requested.
    pub fn start(&mut self) -> Vec<SynthCommand> {
        match self.ctx.remaining_tasks.front().cloned() {
            Some(task) => vec![self.request_draft(task, None)],
            None => self.finish(SynthOutcome::Complete),
        }
    }

    /// Handle one event, returning the next commands.
    pub fn step(&mut self, event: SynthEvent) -> Vec<SynthCommand> {
        let state = std::mem::replace(&mut self.state, State::Terminal(SynthOutcome::Incomplete));
        match (state, event) {
            (State::Drafting { task }, SynthEvent::DraftProduced(draft)) => {
                if !module_delimiters_present(&draft) {
                    debug!("draft rejected structurally, no compiler invocation");
                    let feedback = incomplete_module_message(&draft);
                    vec![self.request_draft(task, Some(feedback))]
                } else {
                    self.state = State::Compiling {
                        task,
                        draft: draft.clone(),
                    };
                    vec![SynthCommand::CompileCandidate { code: draft }]
                }
            }
            (State::Compiling { task, draft }, SynthEvent::CompileFinished(outcome)) => {
                self.ctx.compile_pass = outcome.pass;
                if outcome.pass {
                    if self.ctx.inferred_interface.is_none() {
                        self.ctx.inferred_interface = extract_interface(&draft);
                    }
                    self.state = State::Reviewing {
                        task: task.clone(),
                        draft: draft.clone(),
                    };
                    vec![SynthCommand::RequestReview { task, code: draft }]
                } else {
                    vec![self.request_draft(task, Some(outcome.report))]
                }
            }
            (State::Reviewing { task, draft }, SynthEvent::ReviewReturned(verdict)) => {
                match verdict {
                    ReviewVerdict::Approve => {
                        self.ctx.current_code = draft;
                        self.ctx.complete_front_task();
                        match self.ctx.remaining_tasks.front().cloned() {
                            Some(next) => vec![self.request_draft(next, None)],
                            None => self.finish(SynthOutcome::Complete),
                        }
                    }
                    ReviewVerdict::Revise(feedback) => {
                        vec![self.request_draft(task, Some(feedback))]
                    }
                }
            }
            (State::Terminal(outcome), _) => {
                warn!("event received after loop termination, ignoring");
                self.state = State::Terminal(outcome);
                vec![SynthCommand::Finish(outcome)]
            }
            (state, event) => {
                warn!(?state, ?event, "event does not match loop state, ignoring");
                self.state = state;
                Vec::new()
            }
        }
    }

    /// Emit a draft request, or finish incomplete when the budget is gone.
    fn request_draft(&mut self, task: String, feedback: Option<String>) -> SynthCommand {
        if self.drafts_requested >= self.budget {
            warn!(budget = self.budget, "draft budget exhausted");
            self.state = State::Terminal(SynthOutcome::Incomplete);
            return SynthCommand::Finish(SynthOutcome::Incomplete);
        }
        self.drafts_requested += 1;
        self.state = State::Drafting { task: task.clone() };
        SynthCommand::RequestDraft { task, feedback }
    }

    fn finish(&mut self, outcome: SynthOutcome) -> Vec<SynthCommand> {
        self.state = State::Terminal(outcome);
        vec![SynthCommand::Finish(outcome)]
    }
}

/// Pull the port declaration out of a compiled module: the text from
/// `module` through the closing `);` of its header.
pub fn extract_interface(code: &str) -> Option<String> {
    let start = code.find("module")?;
    let end = code[start..].find(");")? + start + 2;
    Some(code[start..end].to_string())
}
