// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [toolchain]
/// compiler = "iverilog"
/// simulator = "vvp"
/// top_module = "TopModule"
///
/// [limits]
/// synthesis_rounds = 200
/// debug_rounds = 40
///
/// [pipeline]
/// checkpoint_dir = "checkpoints"
/// work_dir = "work"
///
/// [reasoner]
/// command = "my-llm-bridge"
/// ```
///
/// All sections are optional and have defaults matching the values above.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub toolchain: ToolchainSection,

    #[serde(default)]
    pub limits: LimitsSection,

    #[serde(default)]
    pub pipeline: PipelineSection,

    #[serde(default)]
    pub reasoner: ReasonerSection,
}

/// `[toolchain]` section: how the external compiler/simulator is invoked.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolchainSection {
    /// HDL compiler binary.
    #[serde(default = "default_compiler")]
    pub compiler: String,

    /// Flags passed on every compiler invocation.
    #[serde(default = "default_compiler_flags")]
    pub compiler_flags: Vec<String>,

    /// Compiled-image runner.
    #[serde(default = "default_simulator")]
    pub simulator: String,

    /// Top-level module name elaborated when compiling a candidate alone.
    #[serde(default = "default_top_module")]
    pub top_module: String,

    /// Top-level module name of the concatenated harness+design unit.
    #[serde(default = "default_harness_top")]
    pub harness_top: String,

    /// Source lines shown before/after a re-localized diagnostic.
    #[serde(default = "default_error_window")]
    pub error_window: usize,

    /// Hierarchical clock signal used to gate waveform samples.
    #[serde(default = "default_clock_signal")]
    pub clock_signal: String,
}

fn default_compiler() -> String {
    "iverilog".to_string()
}

fn default_compiler_flags() -> Vec<String> {
    ["-Wall", "-Winfloop", "-Wno-timescale", "-g2012"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_simulator() -> String {
    "vvp".to_string()
}

fn default_top_module() -> String {
    "TopModule".to_string()
}

fn default_harness_top() -> String {
    "tb".to_string()
}

fn default_error_window() -> usize {
    5
}

fn default_clock_signal() -> String {
    "tb.clk".to_string()
}

impl Default for ToolchainSection {
    fn default() -> Self {
        Self {
            compiler: default_compiler(),
            compiler_flags: default_compiler_flags(),
            simulator: default_simulator(),
            top_module: default_top_module(),
            harness_top: default_harness_top(),
            error_window: default_error_window(),
            clock_signal: default_clock_signal(),
        }
    }
}

/// `[limits]` section: round budgets and traversal depth.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsSection {
    /// Maximum synthesis-loop rounds before a best-effort stop.
    #[serde(default = "default_synthesis_rounds")]
    pub synthesis_rounds: u64,

    /// Maximum verification-loop rounds before a best-effort stop.
    #[serde(default = "default_debug_rounds")]
    pub debug_rounds: u64,

    /// Knowledge-graph traversal depth used for task grounding.
    #[serde(default = "default_graph_depth")]
    pub graph_depth: usize,
}

fn default_synthesis_rounds() -> u64 {
    200
}

fn default_debug_rounds() -> u64 {
    40
}

fn default_graph_depth() -> usize {
    3
}

impl Default for LimitsSection {
    fn default() -> Self {
        Self {
            synthesis_rounds: default_synthesis_rounds(),
            debug_rounds: default_debug_rounds(),
            graph_depth: default_graph_depth(),
        }
    }
}

/// `[pipeline]` section: where artifacts and scratch files live.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSection {
    /// Root directory for per-run checkpoint artifacts.
    #[serde(default = "default_checkpoint_dir")]
    pub checkpoint_dir: String,

    /// Scratch directory overwritten by toolchain invocations.
    ///
    /// Exactly one active run per work dir; concurrent runs sharing it
    /// corrupt each other's intermediate files.
    #[serde(default = "default_work_dir")]
    pub work_dir: String,
}

fn default_checkpoint_dir() -> String {
    "checkpoints".to_string()
}

fn default_work_dir() -> String {
    "work".to_string()
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            checkpoint_dir: default_checkpoint_dir(),
            work_dir: default_work_dir(),
        }
    }
}

/// `[reasoner]` section: the external reasoning collaborator.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ReasonerSection {
    /// Shell command spawned per request; the prompt arrives on stdin and
    /// the reply is read from stdout.
    #[serde(default)]
    pub command: Option<String>,
}
