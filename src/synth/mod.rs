// src/synth/mod.rs

//! Iterative module synthesis.
//!
//! The loop is split the same way as the verification loop: a
//! synchronous, deterministic core state machine ([`core::SynthCore`])
//! that consumes events and emits commands, and an async driver
//! ([`driver::run_synthesis`]) that executes those commands against the
//! collaborator and the toolchain. The core is unit tested without any
//! Tokio, processes, or filesystem.

pub mod context;
pub mod core;
pub mod driver;

pub use context::WorkflowContext;
pub use core::{SynthCommand, SynthCore, SynthEvent, SynthOutcome};
pub use driver::{run_synthesis, SynthReport};
