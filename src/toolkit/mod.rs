// src/toolkit/mod.rs

//! External compiler/simulator adapter.
//!
//! The loops talk to a [`Toolchain`] instead of spawning processes
//! directly. This makes it easy to swap in a scripted toolchain in tests
//! while keeping the production adapter in [`iverilog`].
//!
//! - [`iverilog`] is the real adapter (iverilog + vvp over fixed
//!   work-dir files).
//! - [`localize`] rewrites diagnostics that land inside the design half
//!   of a concatenated unit into windowed error sections.
//! - [`mismatch`] extracts the functional mismatch count from a
//!   simulation report.

pub mod iverilog;
pub mod localize;
pub mod mismatch;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Result of compiling a candidate on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutcome {
    pub pass: bool,
    pub report: String,
}

/// Result of compiling and simulating a candidate against the harness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimOutcome {
    pub compiled: bool,
    pub functional_pass: bool,
    pub report: String,
}

/// A waveform extraction request, as issued during diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRequest {
    /// Hierarchical signal names, base name before any bit-select suffix.
    pub signals: Vec<String>,
    pub start_time: u64,
    pub end_time: u64,
}

/// Trait abstracting the external HDL toolchain.
///
/// Production code uses [`iverilog::IverilogToolchain`]; tests provide a
/// scripted implementation that never spawns processes.
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Install the harness used by every subsequent `compile_and_run`.
    async fn install_harness(&self, harness: &str) -> Result<()>;

    /// Compile the candidate alone, elaborating the fixed top module.
    ///
    /// Success is signaled by empty diagnostic output, not the exit code.
    async fn compile(&self, code: &str) -> Result<CompileOutcome>;

    /// Compile a harness draft against the design's port declaration,
    /// elaborating the harness top. Harness diagnostics are reported
    /// verbatim, never re-localized.
    async fn check_harness(
        &self,
        harness: &str,
        interface: Option<&str>,
    ) -> Result<CompileOutcome>;

    /// Compile harness + candidate as one unit, then run the image and
    /// scan its report for the mismatch summary line.
    async fn compile_and_run(&self, code: &str) -> Result<SimOutcome>;

    /// Extract a windowed signal table from the last simulation's trace.
    async fn trace(&self, req: &TraceRequest) -> Result<String>;
}

/// Whether the candidate carries the terminal module delimiter.
///
/// A candidate without `endmodule` is rejected without any external
/// invocation; `module` is implied by its suffix.
pub fn module_delimiters_present(code: &str) -> bool {
    code.contains("endmodule")
}

/// Templated corrective message for a structurally incomplete candidate.
pub fn incomplete_module_message(code: &str) -> String {
    format!(
        "[Error] the module is not completed! You need to write the Verilog module code with \
         `module` in the beginning and `endmodule` in the end!\nBelow is the example:\n\
         ```verilog\n{code} endmodule\n```"
    )
}
