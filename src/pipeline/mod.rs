// src/pipeline/mod.rs

//! Checkpointed end-to-end pipeline.
//!
//! Stages run in order (spec, plan, graph, tasks, synthesis,
//! verification) and each leaves one artifact under the run's
//! checkpoint directory. A stage re-executes only when its artifact is
//! absent, so a crashed or halted run resumes from the first missing
//! artifact.

pub mod checkpoint;
pub mod stages;

pub use checkpoint::{CheckpointStore, Stage};
pub use stages::{run_pipeline, PipelineDeps, PipelineOutcome};
