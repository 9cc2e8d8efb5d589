// src/errors.rs

//! Crate-wide error type and helpers.
//!
//! Loop-internal failures (structural rejection, compile diagnostics,
//! functional mismatches, exhausted round budgets) are *data*, carried in
//! outcome values and never surface here. This enum covers the failures
//! that genuinely cross a loop boundary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RtlgenError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unknown graph node: {0}")]
    UnknownNode(String),

    // The endpoint fields avoid the name `source`, which thiserror
    // reserves for the error cause.
    #[error("Dangling edge {edge_source} -> {edge_target}: no node named {missing:?}")]
    DanglingEdge {
        edge_source: String,
        edge_target: String,
        missing: String,
    },

    #[error("Malformed collaborator reply: {0}")]
    MalformedReply(String),

    #[error("Simulation report violates the harness contract: {0}")]
    ToolContractViolation(String),

    #[error("No checkpoint artifact for stage {0}")]
    MissingCheckpoint(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, RtlgenError>;
