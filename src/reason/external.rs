// src/reason/external.rs

//! Command-backed [`Reasoner`].
//!
//! The configured shell command receives one prompt on stdin and must
//! write its full reply to stdout. Structured replies travel as fenced
//! JSON; code travels as fenced Verilog. Replies that cannot be parsed
//! surface as [`RtlgenError::MalformedReply`].

use std::process::Stdio;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::errors::{Result, RtlgenError};
use crate::graph::grounding::PlanGrounding;
use crate::reason::{
    prompts, DebugAction, DiagnoseRequest, DraftRequest, EntitySet, HarnessRequest, PlanStep,
    Reasoner, RelationshipSet, ReviewRequest, ReviewVerdict,
};
use crate::toolkit::TraceRequest;

pub struct CommandReasoner {
    command: String,
}

impl CommandReasoner {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    async fn invoke(&self, prompt: &str) -> Result<String> {
        debug!(bytes = prompt.len(), "invoking collaborator command");
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(prompt.as_bytes()).await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RtlgenError::MalformedReply(format!(
                "collaborator command exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn invoke_json<T: for<'de> Deserialize<'de>>(&self, prompt: &str) -> Result<T> {
        let reply = self.invoke(prompt).await?;
        let payload = extract_json_from_markdown(&reply);
        serde_json::from_str(payload).map_err(|e| {
            RtlgenError::MalformedReply(format!("unparseable JSON reply: {e}"))
        })
    }
}

/// The JSON shape of a diagnosis reply.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
enum DebugActionWire {
    Revise {
        code: String,
    },
    Waveform {
        signals: Vec<String>,
        start_time: u64,
        end_time: u64,
    },
}

#[async_trait]
impl Reasoner for CommandReasoner {
    async fn propose_plan(&self, spec: &str) -> Result<Vec<PlanStep>> {
        self.invoke_json(&prompts::plan_prompt(spec)).await
    }

    async fn extract_entities(&self, spec: &str, plan: &[PlanStep]) -> Result<EntitySet> {
        let plan_json = serde_json::to_string_pretty(plan)?;
        self.invoke_json(&prompts::entity_prompt(spec, &plan_json))
            .await
    }

    async fn extract_relationships(
        &self,
        spec: &str,
        entities: &EntitySet,
    ) -> Result<RelationshipSet> {
        self.invoke_json(&prompts::relationship_prompt(spec, entities))
            .await
    }

    async fn finalize_tasks(
        &self,
        spec: &str,
        groundings: &[PlanGrounding],
    ) -> Result<Vec<String>> {
        self.invoke_json(&prompts::task_prompt(spec, groundings))
            .await
    }

    async fn draft_design(&self, request: &DraftRequest) -> Result<String> {
        let reply = self.invoke(&prompts::draft_prompt(request)).await?;
        Ok(extract_code_block(&reply))
    }

    async fn review_design(&self, request: &ReviewRequest) -> Result<ReviewVerdict> {
        let reply = self.invoke(&prompts::review_prompt(request)).await?;
        reply.parse()
    }

    async fn draft_harness(&self, request: &HarnessRequest) -> Result<String> {
        let reply = self.invoke(&prompts::harness_prompt(request)).await?;
        Ok(extract_code_block(&reply))
    }

    async fn review_harness(&self, harness: &str, spec: &str) -> Result<ReviewVerdict> {
        let reply = self
            .invoke(&prompts::harness_review_prompt(harness, spec))
            .await?;
        reply.parse()
    }

    async fn diagnose(&self, request: &DiagnoseRequest) -> Result<DebugAction> {
        let wire: DebugActionWire = self
            .invoke_json(&prompts::diagnose_prompt(request))
            .await?;
        Ok(match wire {
            DebugActionWire::Revise { code } => DebugAction::ReviseCode(code),
            DebugActionWire::Waveform {
                signals,
                start_time,
                end_time,
            } => DebugAction::InspectWaveform(TraceRequest {
                signals,
                start_time,
                end_time,
            }),
        })
    }
}

/// Return the body of the first ```json fence, or the trimmed reply when
/// the collaborator skipped the fence.
pub fn extract_json_from_markdown(reply: &str) -> &str {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE
        .get_or_init(|| Regex::new(r"(?s)```(?:json)?[ \t]*\n(.*?)```").expect("valid regex"));
    match fence.captures(reply) {
        Some(caps) => caps.get(1).map(|m| m.as_str().trim()).unwrap_or(""),
        None => reply.trim(),
    }
}

/// Return the body of the first code fence, or the trimmed reply.
pub fn extract_code_block(reply: &str) -> String {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)```(?:[A-Za-z0-9_-]+)?[ \t]*\n(.*?)```").expect("valid regex")
    });
    match fence.captures(reply) {
        Some(caps) => caps
            .get(1)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
        None => reply.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_json_is_unwrapped() {
        let reply = "Here you go:\n```json\n{\"a\": 1}\n```\nDone.";
        assert_eq!(extract_json_from_markdown(reply), "{\"a\": 1}");
    }

    #[test]
    fn unfenced_reply_passes_through() {
        assert_eq!(extract_json_from_markdown("  [1, 2]  "), "[1, 2]");
    }

    #[test]
    fn verilog_fence_is_unwrapped() {
        let reply = "```verilog\nmodule m;\nendmodule\n```";
        assert_eq!(extract_code_block(reply), "module m;\nendmodule");
    }

    #[test]
    fn approve_line_parses_as_approval() {
        let v: ReviewVerdict = "APPROVED, looks right.".parse().unwrap();
        assert_eq!(v, ReviewVerdict::Approve);
    }

    #[test]
    fn anything_else_is_revision_feedback() {
        let v: ReviewVerdict = "The counter never resets.".parse().unwrap();
        assert_eq!(
            v,
            ReviewVerdict::Revise("The counter never resets.".to_string())
        );
    }
}
