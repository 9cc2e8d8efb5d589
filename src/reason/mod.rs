// src/reason/mod.rs

//! External collaborator seam.
//!
//! Every judgment call in the pipeline (planning, entity extraction,
//! drafting, review, diagnosis) goes through the [`Reasoner`] trait;
//! harness sign-off goes through [`Operator`]. Production wires in
//! [`external::CommandReasoner`], which shells out to a configured
//! command; tests script replies directly.

pub mod external;
pub mod prompts;

use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, RtlgenError};
use crate::graph::grounding::PlanGrounding;
use crate::graph::model::{EdgeExport, EntityRecord};
use crate::toolkit::TraceRequest;

/// One step of the high-level implementation plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    pub name: String,
    pub description: String,
}

/// Entities extracted from the specification, bucketed by kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntitySet {
    #[serde(default)]
    pub plans: Vec<EntityRecord>,
    #[serde(default)]
    pub signals: Vec<EntityRecord>,
    #[serde(default)]
    pub fsm_states: Vec<EntityRecord>,
    #[serde(default)]
    pub examples: Vec<EntityRecord>,
}

/// Directed relationships between previously extracted entities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipSet {
    #[serde(default)]
    pub relationships: Vec<EdgeExport>,
}

/// Inputs to a single module draft.
#[derive(Debug, Clone)]
pub struct DraftRequest {
    /// The task being implemented in this round.
    pub task: String,
    /// Rejection message from the previous round's compile or review,
    /// when this is a retry.
    pub feedback: Option<String>,
    /// Code accumulated from previously completed tasks.
    pub current_code: String,
    /// Port declaration captured from the first successful compile.
    pub interface: Option<String>,
}

/// Inputs to a design review.
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub task: String,
    pub code: String,
}

/// Inputs to a harness draft.
#[derive(Debug, Clone)]
pub struct HarnessRequest {
    pub spec: String,
    /// Port declaration of the design under test, when known.
    pub interface: Option<String>,
    /// Operator or review feedback from the previous attempt.
    pub feedback: Option<String>,
}

/// Inputs to a failure diagnosis.
#[derive(Debug, Clone)]
pub struct DiagnoseRequest {
    pub code: String,
    pub harness: String,
    pub report: String,
    /// Rendered waveform table, present only after an extraction round.
    pub trace: Option<String>,
}

/// Verdict on a draft, design or harness alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewVerdict {
    Approve,
    Revise(String),
}

impl FromStr for ReviewVerdict {
    type Err = RtlgenError;

    /// A reply whose first non-empty line starts with `APPROVE` is an
    /// approval; anything else is revision feedback verbatim.
    fn from_str(reply: &str) -> Result<Self> {
        let first = reply.lines().map(str::trim).find(|l| !l.is_empty());
        match first {
            Some(line) if line.to_ascii_uppercase().starts_with("APPROVE") => {
                Ok(ReviewVerdict::Approve)
            }
            Some(_) => Ok(ReviewVerdict::Revise(reply.trim().to_string())),
            None => Err(RtlgenError::MalformedReply(
                "empty review reply".to_string(),
            )),
        }
    }
}

/// Next move chosen while debugging a functional failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugAction {
    /// Replace the candidate with this revision and re-simulate.
    ReviseCode(String),
    /// Pull a signal window from the last trace before deciding.
    InspectWaveform(TraceRequest),
}

/// Verdict from the human (or batch) operator on a harness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarnessVerdict {
    Accept,
    Reject(String),
}

/// The external collaborator that produces every plan, draft and verdict.
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Break the specification into ordered implementation steps.
    async fn propose_plan(&self, spec: &str) -> Result<Vec<PlanStep>>;

    /// Extract named entities for the knowledge graph.
    async fn extract_entities(&self, spec: &str, plan: &[PlanStep]) -> Result<EntitySet>;

    /// Extract directed relationships between the extracted entities.
    async fn extract_relationships(
        &self,
        spec: &str,
        entities: &EntitySet,
    ) -> Result<RelationshipSet>;

    /// Turn grounded plans into the final ordered task list.
    async fn finalize_tasks(&self, spec: &str, groundings: &[PlanGrounding])
        -> Result<Vec<String>>;

    /// Draft module code for one task.
    async fn draft_design(&self, request: &DraftRequest) -> Result<String>;

    /// Judge a compiled draft against its task.
    async fn review_design(&self, request: &ReviewRequest) -> Result<ReviewVerdict>;

    /// Draft a self-checking harness for the specification.
    async fn draft_harness(&self, request: &HarnessRequest) -> Result<String>;

    /// Judge a harness draft against the specification.
    async fn review_harness(&self, harness: &str, spec: &str) -> Result<ReviewVerdict>;

    /// Choose the next debugging move from a failing simulation report.
    async fn diagnose(&self, request: &DiagnoseRequest) -> Result<DebugAction>;
}

/// Harness sign-off authority.
#[async_trait]
pub trait Operator: Send + Sync {
    async fn approve_harness(&self, harness: &str) -> Result<HarnessVerdict>;
}

/// Operator for unattended runs: accepts every reviewed harness.
#[derive(Debug, Default)]
pub struct BatchOperator;

#[async_trait]
impl Operator for BatchOperator {
    async fn approve_harness(&self, _harness: &str) -> Result<HarnessVerdict> {
        Ok(HarnessVerdict::Accept)
    }
}

/// Interactive operator: prints the harness and reads one verdict line.
#[derive(Debug, Default)]
pub struct ConsoleOperator;

#[async_trait]
impl Operator for ConsoleOperator {
    async fn approve_harness(&self, harness: &str) -> Result<HarnessVerdict> {
        use tokio::io::{AsyncBufReadExt, BufReader};

        println!("---- proposed harness ----");
        println!("{harness}");
        println!("---- accept? [y / reason for rejection] ----");

        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        reader.read_line(&mut line).await?;
        let line = line.trim();

        if line.eq_ignore_ascii_case("y") || line.eq_ignore_ascii_case("yes") {
            Ok(HarnessVerdict::Accept)
        } else {
            Ok(HarnessVerdict::Reject(line.to_string()))
        }
    }
}
