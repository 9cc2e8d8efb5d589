// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `rtlgen`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "rtlgen",
    version,
    about = "Generate and verify Verilog from a natural-language spec through a tool-grounded loop.",
    long_about = None
)]
pub struct CliArgs {
    /// Unique identifier for this run; names the checkpoint directory.
    #[arg(long, value_name = "ID")]
    pub run_id: String,

    /// Path to the design specification text.
    ///
    /// Required on the first run; later runs can resume from the
    /// checkpointed copy.
    #[arg(long, value_name = "PATH")]
    pub spec_file: Option<String>,

    /// Path to a caller-supplied self-checking testbench.
    ///
    /// If omitted, the verification stage synthesizes one.
    #[arg(long, value_name = "PATH")]
    pub testbench_file: Option<String>,

    /// Path to the reference RTL compiled alongside the testbench.
    #[arg(long, value_name = "PATH")]
    pub reference_file: Option<String>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Rtlgen.toml` in the current working directory; missing
    /// file means built-in defaults.
    #[arg(long, value_name = "PATH", default_value = "Rtlgen.toml")]
    pub config: String,

    /// Run without operator interaction (synthesized harnesses are
    /// accepted as-is).
    #[arg(long)]
    pub batch: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RTLGEN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the pipeline stages and which checkpoints would be skipped,
    /// without executing anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(lvl: LogLevel) -> Self {
        match lvl {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
