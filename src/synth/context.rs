// src/synth/context.rs

//! Shared workflow state carried across synthesis rounds.

use std::collections::VecDeque;

/// Accumulated state of the synthesis loop.
///
/// Commands carry owned snapshots of whatever they need, so a round
/// never observes a half-updated context.
#[derive(Debug, Clone, Default)]
pub struct WorkflowContext {
    /// Code accumulated from approved tasks. Always the last candidate
    /// that both compiled and passed review.
    pub current_code: String,
    /// Port declaration captured from the first successful compile.
    pub inferred_interface: Option<String>,
    /// Whether the latest candidate compiled.
    pub compile_pass: bool,
    /// Tasks still to implement, in order. The front task stays put
    /// until its draft is approved.
    pub remaining_tasks: VecDeque<String>,
    pub completed_tasks: Vec<String>,
}

impl WorkflowContext {
    pub fn new(tasks: Vec<String>) -> Self {
        Self {
            remaining_tasks: tasks.into(),
            ..Self::default()
        }
    }

    /// Mark the front task complete and advance to the next.
    pub fn complete_front_task(&mut self) {
        if let Some(task) = self.remaining_tasks.pop_front() {
            self.completed_tasks.push(task);
        }
    }
}
