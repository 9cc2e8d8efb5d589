// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod graph;
pub mod logging;
pub mod pipeline;
pub mod reason;
pub mod synth;
pub mod toolkit;
pub mod verify;
pub mod wave;

use std::path::PathBuf;

use tracing::info;

use crate::cli::CliArgs;
use crate::config::load_or_default;
use crate::config::model::ConfigFile;
use crate::errors::{Result, RtlgenError};
use crate::pipeline::{run_pipeline, CheckpointStore, PipelineDeps, PipelineOutcome, Stage};
use crate::reason::external::CommandReasoner;
use crate::reason::{BatchOperator, ConsoleOperator, Operator};
use crate::toolkit::iverilog::IverilogToolchain;

/// High-level entry point used by `main.rs`.
///
/// Wires together config, the checkpoint store, the collaborator
/// command, the operator, and the real toolchain, then runs the
/// pipeline.
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(PathBuf::from(&args.config))?;

    let store = CheckpointStore::open(&cfg.pipeline.checkpoint_dir, &args.run_id)?;

    if args.dry_run {
        print_dry_run(&cfg, &store, &args);
        return Ok(());
    }

    let spec_text = match &args.spec_file {
        Some(path) => Some(std::fs::read_to_string(path)?),
        None => None,
    };

    // A caller-supplied testbench becomes the harness checkpoint, so the
    // verification stage starts at simulation.
    if let Some(path) = &args.testbench_file {
        if !store.has(Stage::Harness) {
            store.put(Stage::Harness, &std::fs::read_to_string(path)?)?;
        }
    }

    let command = cfg.reasoner.command.clone().ok_or_else(|| {
        RtlgenError::ConfigError("reasoner.command must be set to run the pipeline".into())
    })?;
    let reasoner = CommandReasoner::new(command);

    let operator: Box<dyn Operator> = if args.batch {
        Box::new(BatchOperator)
    } else {
        Box::new(ConsoleOperator)
    };

    let mut toolchain = IverilogToolchain::new(&cfg.pipeline.work_dir, cfg.toolchain.clone())?;
    if let Some(path) = &args.reference_file {
        toolchain.set_reference_rtl(path);
    }

    let deps = PipelineDeps {
        reasoner: &reasoner,
        operator: operator.as_ref(),
        toolchain: &toolchain,
    };

    let outcome = run_pipeline(&deps, &store, &cfg, spec_text.as_deref()).await?;

    match outcome {
        PipelineOutcome::Verified => {
            info!(artifact = ?store.path(Stage::Verified), "run complete");
            println!("verified: {}", store.path(Stage::Verified).display());
        }
        PipelineOutcome::BestEffort => {
            info!(artifact = ?store.path(Stage::BestEffort), "run halted");
            println!("best effort: {}", store.path(Stage::BestEffort).display());
        }
    }

    Ok(())
}

/// Simple dry-run output: print each stage and whether its checkpoint
/// would skip it.
fn print_dry_run(cfg: &ConfigFile, store: &CheckpointStore, args: &CliArgs) {
    println!("rtlgen dry-run (run id: {})", args.run_id);
    println!("  checkpoint_dir = {}", cfg.pipeline.checkpoint_dir);
    println!("  work_dir = {}", cfg.pipeline.work_dir);
    println!(
        "  limits = {} synthesis rounds, {} debug rounds, graph depth {}",
        cfg.limits.synthesis_rounds, cfg.limits.debug_rounds, cfg.limits.graph_depth
    );
    println!();

    const ORDER: [Stage; 9] = [
        Stage::Spec,
        Stage::Plan,
        Stage::Graph,
        Stage::Tasks,
        Stage::Implementation,
        Stage::Interface,
        Stage::Harness,
        Stage::Verified,
        Stage::BestEffort,
    ];
    println!("stages:");
    for stage in ORDER {
        let status = if store.has(stage) {
            "skip (checkpointed)"
        } else {
            "run"
        };
        println!("  - {stage:<14} {:<18} {status}", stage.artifact());
    }
}
