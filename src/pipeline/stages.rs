// src/pipeline/stages.rs

//! Stage implementations and the end-to-end run.

use tracing::{info, warn};

use crate::config::model::ConfigFile;
use crate::errors::{Result, RtlgenError};
use crate::graph::{assemble_groundings, GraphExport, KnowledgeGraph, NodeType};
use crate::pipeline::{CheckpointStore, Stage};
use crate::reason::{Operator, PlanStep, Reasoner};
use crate::synth::{run_synthesis, SynthOutcome};
use crate::toolkit::Toolchain;
use crate::verify::{run_verification, VerifyOutcome};

/// The three collaborating roles a pipeline run needs.
pub struct PipelineDeps<'a> {
    pub reasoner: &'a dyn Reasoner,
    pub operator: &'a dyn Operator,
    pub toolchain: &'a dyn Toolchain,
}

/// What the run left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// `TopModule.v` checkpointed; the design passed its harness.
    Verified,
    /// `TopModule_buggy.v` checkpointed; the debug budget ran out.
    BestEffort,
}

/// Run every stage in order, skipping those whose artifact exists.
///
/// `spec_text` seeds the spec checkpoint on a fresh run; a resumed run
/// reads the checkpointed copy and may omit it.
pub async fn run_pipeline(
    deps: &PipelineDeps<'_>,
    store: &CheckpointStore,
    config: &ConfigFile,
    spec_text: Option<&str>,
) -> Result<PipelineOutcome> {
    // Spec.
    if !store.has(Stage::Spec) {
        let text = spec_text.ok_or_else(|| {
            RtlgenError::ConfigError(
                "no specification: pass a spec file or resume a run with a spec checkpoint"
                    .into(),
            )
        })?;
        store.put(Stage::Spec, text)?;
    }
    let spec = store.get(Stage::Spec)?;

    // Plan.
    let plan: Vec<PlanStep> = if store.has(Stage::Plan) {
        info!(stage = %Stage::Plan, "checkpoint present, skipping");
        store.get_json(Stage::Plan)?
    } else {
        let plan = deps.reasoner.propose_plan(&spec).await?;
        store.put_json(Stage::Plan, &plan)?;
        plan
    };
    info!(steps = plan.len(), "plan ready");

    // Graph.
    let kg = if store.has(Stage::Graph) {
        info!(stage = %Stage::Graph, "checkpoint present, skipping");
        let export: GraphExport = store.get_json(Stage::Graph)?;
        KnowledgeGraph::from_export(&export)?
    } else {
        let kg = build_graph(deps.reasoner, &spec, &plan).await?;
        store.put_json(Stage::Graph, &kg.export())?;
        kg
    };
    info!(nodes = kg.node_count(), edges = kg.edge_count(), "graph ready");

    // Tasks.
    let tasks: Vec<String> = if store.has(Stage::Tasks) {
        info!(stage = %Stage::Tasks, "checkpoint present, skipping");
        store.get_json(Stage::Tasks)?
    } else {
        let groundings = assemble_groundings(&kg, config.limits.graph_depth);
        let tasks = deps.reasoner.finalize_tasks(&spec, &groundings).await?;
        store.put_json(Stage::Tasks, &tasks)?;
        tasks
    };
    info!(tasks = tasks.len(), "task list ready");

    // Synthesis.
    let (code, interface) = if store.has(Stage::Implementation) {
        info!(stage = %Stage::Implementation, "checkpoint present, skipping");
        let code = store.get(Stage::Implementation)?;
        let interface = store
            .has(Stage::Interface)
            .then(|| store.get(Stage::Interface))
            .transpose()?;
        (code, interface)
    } else {
        let report = run_synthesis(
            deps.reasoner,
            deps.toolchain,
            tasks,
            config.limits.synthesis_rounds as u32,
        )
        .await?;
        if report.outcome == SynthOutcome::Incomplete {
            // Proceed anyway; verification will judge what exists.
            warn!("synthesis ended with tasks outstanding");
        }
        store.put(Stage::Implementation, &report.code)?;
        if let Some(ref iface) = report.interface {
            store.put(Stage::Interface, iface)?;
        }
        (report.code, report.interface)
    };

    // Verification.
    if store.has(Stage::Verified) {
        info!(stage = %Stage::Verified, "checkpoint present, nothing to do");
        return Ok(PipelineOutcome::Verified);
    }
    let existing_harness = store
        .has(Stage::Harness)
        .then(|| store.get(Stage::Harness))
        .transpose()?;
    let report = run_verification(
        deps.reasoner,
        deps.operator,
        deps.toolchain,
        &spec,
        interface.as_deref(),
        code,
        existing_harness,
        config.limits.debug_rounds as u32,
    )
    .await?;

    if let Some(ref harness) = report.harness {
        if !store.has(Stage::Harness) {
            store.put(Stage::Harness, harness)?;
        }
    }

    match report.outcome {
        VerifyOutcome::Pass => {
            store.put(Stage::Verified, &report.code)?;
            info!("design verified");
            Ok(PipelineOutcome::Verified)
        }
        VerifyOutcome::Fail => {
            store.put(Stage::BestEffort, &report.code)?;
            warn!("verification failed; best-effort design checkpointed");
            Ok(PipelineOutcome::BestEffort)
        }
    }
}

/// Build the knowledge graph from extracted entities and relationships.
///
/// Edges naming unknown endpoints are skipped with a warning rather than
/// aborting the stage.
pub async fn build_graph(
    reasoner: &dyn Reasoner,
    spec: &str,
    plan: &[PlanStep],
) -> Result<KnowledgeGraph> {
    let entities = reasoner.extract_entities(spec, plan).await?;
    let mut kg = KnowledgeGraph::new();

    for e in &entities.plans {
        kg.insert_node(&e.name, NodeType::Plan, &e.description);
    }
    for e in &entities.signals {
        kg.insert_node(&e.name, NodeType::Signal, &e.description);
    }
    for e in &entities.fsm_states {
        kg.insert_node(&e.name, NodeType::FsmState, &e.description);
    }
    for e in &entities.examples {
        kg.insert_node(&e.name, NodeType::Example, &e.description);
    }

    let rels = reasoner.extract_relationships(spec, &entities).await?;
    for edge in rels.relationships {
        if let Err(err) = kg.add_edge(&edge.source, &edge.target, edge.relationship) {
            warn!(%err, "skipping relationship");
        }
    }

    Ok(kg)
}
