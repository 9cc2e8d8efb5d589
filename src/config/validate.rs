// src/config/validate.rs

//! Semantic validation of a deserialized [`ConfigFile`].

use anyhow::{bail, Result};

use crate::config::model::ConfigFile;

/// Validate global config sanity.
///
/// Serde already guarantees shape; this checks the values a typo would
/// most likely break.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    if cfg.toolchain.compiler.trim().is_empty() {
        bail!("toolchain.compiler must not be empty");
    }
    if cfg.toolchain.simulator.trim().is_empty() {
        bail!("toolchain.simulator must not be empty");
    }
    if cfg.toolchain.top_module.trim().is_empty() {
        bail!("toolchain.top_module must not be empty");
    }
    if cfg.toolchain.harness_top.trim().is_empty() {
        bail!("toolchain.harness_top must not be empty");
    }
    if cfg.toolchain.error_window == 0 {
        bail!("toolchain.error_window must be at least 1");
    }

    if cfg.limits.synthesis_rounds == 0 {
        bail!("limits.synthesis_rounds must be at least 1");
    }
    if cfg.limits.debug_rounds == 0 {
        bail!("limits.debug_rounds must be at least 1");
    }
    if cfg.limits.graph_depth == 0 {
        bail!("limits.graph_depth must be at least 1");
    }

    if let Some(cmd) = &cfg.reasoner.command {
        if cmd.trim().is_empty() {
            bail!("reasoner.command must not be empty when set");
        }
    }

    Ok(())
}
