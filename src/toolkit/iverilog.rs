// src/toolkit/iverilog.rs

//! Real toolchain adapter over iverilog + vvp.
//!
//! Every invocation overwrites the same fixed files under the work
//! directory (candidate unit, concatenated unit, compiled image, trace).
//! Exactly one active run per work dir; there is no locking.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::model::ToolchainSection;
use crate::errors::{Result, RtlgenError};
use crate::toolkit::localize::localize_compile_report;
use crate::toolkit::mismatch::extract_mismatch_count;
use crate::toolkit::{
    incomplete_module_message, module_delimiters_present, CompileOutcome, SimOutcome, Toolchain,
    TraceRequest,
};
use crate::wave::extract_traces;

const DESIGN_FILE: &str = "test.v";
const UNIT_FILE: &str = "test.sv";
const IMAGE_FILE: &str = "test.vpp";
const TRACE_FILE: &str = "wave.vcd";

/// Guidance appended to a functional-failure report so the next revision
/// is grounded in waveform evidence rather than guesswork.
const WAVEFORM_FIRST_GUIDANCE: &str = "\n\n**Only focus on the first point of failure in time. \
     Please trace the waveform around that time with a window width of at least 100 \
     to check the signals. Don't fix the code without inspecting the waveform.**";

const TRACE_AGAIN_GUIDANCE: &str = "\n\n**Please trace again with more signals or a wider time \
     window if you are not 100 % sure about the bug. Don't fix the code if you don't have \
     enough information from the waveform.**\n";

pub struct IverilogToolchain {
    workdir: PathBuf,
    opts: ToolchainSection,
    harness: Mutex<Option<String>>,
    reference_rtl: Option<PathBuf>,
}

impl IverilogToolchain {
    /// Create the adapter, ensuring the work directory exists.
    pub fn new(workdir: impl Into<PathBuf>, opts: ToolchainSection) -> Result<Self> {
        let workdir = workdir.into();
        std::fs::create_dir_all(&workdir)?;
        Ok(Self {
            workdir,
            opts,
            harness: Mutex::new(None),
            reference_rtl: None,
        })
    }

    pub fn has_harness(&self) -> bool {
        self.harness.lock().unwrap().is_some()
    }

    /// Reference RTL compiled alongside the unit for comparison harnesses.
    pub fn set_reference_rtl(&mut self, path: impl Into<PathBuf>) {
        self.reference_rtl = Some(path.into());
    }

    pub fn trace_path(&self) -> PathBuf {
        self.workdir.join(TRACE_FILE)
    }

    fn path(&self, name: &str) -> PathBuf {
        self.workdir.join(name)
    }

    /// Run the compiler and return its combined diagnostic output.
    ///
    /// Diagnostics, not the exit code, decide success: an empty combined
    /// stream is the success signal.
    async fn run_compiler(&self, top: &str, source: &Path) -> Result<String> {
        let mut cmd = Command::new(&self.opts.compiler);
        cmd.args(&self.opts.compiler_flags)
            .arg("-s")
            .arg(top)
            .arg("-o")
            .arg(self.path(IMAGE_FILE))
            .arg(source);
        if let Some(ref rtl) = self.reference_rtl {
            cmd.arg(rtl);
        }

        debug!(compiler = %self.opts.compiler, top, ?source, "invoking compiler");
        let output = cmd.output().await?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(combined.trim().to_string())
    }

    /// Run the compiled image and return its textual report.
    async fn run_simulator(&self) -> Result<String> {
        let output = Command::new(&self.opts.simulator)
            .arg(self.path(IMAGE_FILE))
            .stderr(Stdio::null())
            .output()
            .await?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// vvp drops the trace in the current working directory; relocate it
    /// next to the other per-invocation files.
    async fn collect_trace_file(&self) -> Result<()> {
        let cwd_trace = std::env::current_dir()?.join(TRACE_FILE);
        if cwd_trace.exists() && cwd_trace != self.trace_path() {
            move_file(&cwd_trace, &self.trace_path()).await?;
        }
        Ok(())
    }
}

/// Move `from` to `to`, falling back to copy-and-remove when the plain
/// rename is refused. The work dir may sit on a different filesystem
/// than the simulator's cwd, where rename fails with `EXDEV`.
async fn move_file(from: &Path, to: &Path) -> Result<()> {
    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }
    tokio::fs::copy(from, to).await?;
    tokio::fs::remove_file(from).await?;
    Ok(())
}

#[async_trait]
impl Toolchain for IverilogToolchain {
    async fn install_harness(&self, harness: &str) -> Result<()> {
        *self.harness.lock().unwrap() = Some(harness.to_string());
        Ok(())
    }

    async fn compile(&self, code: &str) -> Result<CompileOutcome> {
        if !module_delimiters_present(code) {
            return Ok(CompileOutcome {
                pass: false,
                report: incomplete_module_message(code),
            });
        }

        let code = code.trim();
        tokio::fs::write(self.path(DESIGN_FILE), code).await?;

        let diagnostics = self
            .run_compiler(&self.opts.top_module, &self.path(DESIGN_FILE))
            .await?;

        if diagnostics.is_empty() {
            Ok(CompileOutcome {
                pass: true,
                report: format!("[Compiled Success Verilog Module]:\n```verilog\n{code}\n```"),
            })
        } else {
            Ok(CompileOutcome {
                pass: false,
                report: format!("[Compiled Failed Report]\n{diagnostics}"),
            })
        }
    }

    async fn check_harness(
        &self,
        harness: &str,
        interface: Option<&str>,
    ) -> Result<CompileOutcome> {
        if !module_delimiters_present(harness) {
            return Ok(CompileOutcome {
                pass: false,
                report: incomplete_module_message(harness),
            });
        }

        // An empty-bodied module stub lets the harness elaborate before
        // any design draft exists.
        let unit = match interface {
            Some(iface) => format!("{}\n{}\nendmodule\n", harness.trim(), iface.trim()),
            None => format!("{}\n", harness.trim()),
        };
        tokio::fs::write(self.path(UNIT_FILE), &unit).await?;

        let diagnostics = self
            .run_compiler(&self.opts.harness_top, &self.path(UNIT_FILE))
            .await?;

        if diagnostics.is_empty() {
            Ok(CompileOutcome {
                pass: true,
                report: "[Compiled Success Testbench]".to_string(),
            })
        } else {
            Ok(CompileOutcome {
                pass: false,
                report: format!("[Compiled Failed Report]\n{diagnostics}"),
            })
        }
    }

    async fn compile_and_run(&self, code: &str) -> Result<SimOutcome> {
        let harness = self.harness.lock().unwrap().clone().ok_or_else(|| {
            RtlgenError::ConfigError("simulation requested before a harness was loaded".into())
        })?;

        if !module_delimiters_present(code) {
            return Ok(SimOutcome {
                compiled: false,
                functional_pass: false,
                report: incomplete_module_message(code),
            });
        }

        let code = code.trim();
        let unit = format!("{harness}\n{code}");
        let harness_lines = harness.lines().count();

        tokio::fs::write(self.path(UNIT_FILE), &unit).await?;
        tokio::fs::write(self.path(DESIGN_FILE), code).await?;

        let diagnostics = self
            .run_compiler(&self.opts.harness_top, &self.path(UNIT_FILE))
            .await?;

        if !diagnostics.is_empty() {
            return Ok(SimOutcome {
                compiled: false,
                functional_pass: false,
                report: localize_compile_report(
                    &diagnostics,
                    &unit,
                    harness_lines,
                    self.opts.error_window,
                ),
            });
        }

        // Stale traces must not leak into the next diagnosis.
        let _ = tokio::fs::remove_file(self.trace_path()).await;

        info!(workdir = ?self.workdir, "compile clean; running simulation");
        let report = self.run_simulator().await?;
        self.collect_trace_file().await?;

        match extract_mismatch_count(&report) {
            None => Err(RtlgenError::ToolContractViolation(format!(
                "no recognized mismatch summary line in simulation report:\n{report}"
            ))),
            Some(0) => Ok(SimOutcome {
                compiled: true,
                functional_pass: true,
                report: format!("[Compiled Success]\n[Function Check Success]\n{report}"),
            }),
            Some(count) => {
                debug!(count, "functional mismatches reported");
                Ok(SimOutcome {
                    compiled: true,
                    functional_pass: false,
                    report: format!(
                        "[Compiled Success]\n[Function Check Failed]\n==Tool Output==\n{report}\
                         ==Tool Output End=={WAVEFORM_FIRST_GUIDANCE}"
                    ),
                })
            }
        }
    }

    async fn trace(&self, req: &TraceRequest) -> Result<String> {
        let window = req.end_time.saturating_sub(req.start_time);
        let table = extract_traces(
            &self.trace_path(),
            &req.signals,
            req.start_time,
            window,
            Some(self.opts.clock_signal.as_str()),
        )?;
        Ok(format!("{}{TRACE_AGAIN_GUIDANCE}", table.render()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn move_file_relocates_between_directories() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let from = src.path().join(TRACE_FILE);
        let to = dst.path().join(TRACE_FILE);
        tokio::fs::write(&from, "$enddefinitions $end\n").await.unwrap();

        move_file(&from, &to).await.unwrap();

        assert!(!from.exists());
        let moved = tokio::fs::read_to_string(&to).await.unwrap();
        assert_eq!(moved, "$enddefinitions $end\n");
    }

    #[tokio::test]
    async fn move_file_overwrites_a_stale_destination() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("fresh.vcd");
        let to = dir.path().join(TRACE_FILE);
        tokio::fs::write(&from, "fresh").await.unwrap();
        tokio::fs::write(&to, "stale").await.unwrap();

        move_file(&from, &to).await.unwrap();

        assert!(!from.exists());
        assert_eq!(tokio::fs::read_to_string(&to).await.unwrap(), "fresh");
    }
}
