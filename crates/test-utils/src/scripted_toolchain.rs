use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use rtlgen::errors::{Result, RtlgenError};
use rtlgen::toolkit::{CompileOutcome, SimOutcome, Toolchain, TraceRequest};

/// A toolchain that replays scripted outcomes and never spawns processes.
///
/// Call counters let tests assert that structurally rejected candidates
/// never reach the tools.
#[derive(Default)]
pub struct ScriptedToolchain {
    compiles: Mutex<VecDeque<CompileOutcome>>,
    harness_checks: Mutex<VecDeque<CompileOutcome>>,
    sims: Mutex<VecDeque<SimOutcome>>,
    traces: Mutex<VecDeque<String>>,

    /// Code passed to each `compile` call.
    pub compiled: Mutex<Vec<String>>,
    /// Harness text passed to each `check_harness` call.
    pub harness_checked: Mutex<Vec<String>>,
    /// Code passed to each `compile_and_run` call.
    pub simulated: Mutex<Vec<String>>,
    /// Every trace request seen.
    pub trace_requests: Mutex<Vec<TraceRequest>>,
    /// The harness installed most recently.
    pub harness: Mutex<Option<String>>,
}

impl ScriptedToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_compile(self, outcome: CompileOutcome) -> Self {
        self.compiles.lock().unwrap().push_back(outcome);
        self
    }

    pub fn push_harness_check(self, outcome: CompileOutcome) -> Self {
        self.harness_checks.lock().unwrap().push_back(outcome);
        self
    }

    pub fn push_sim(self, outcome: SimOutcome) -> Self {
        self.sims.lock().unwrap().push_back(outcome);
        self
    }

    pub fn push_trace(self, table: &str) -> Self {
        self.traces.lock().unwrap().push_back(table.to_string());
        self
    }

    pub fn compile_calls(&self) -> usize {
        self.compiled.lock().unwrap().len()
    }

    pub fn harness_check_calls(&self) -> usize {
        self.harness_checked.lock().unwrap().len()
    }

    pub fn sim_calls(&self) -> usize {
        self.simulated.lock().unwrap().len()
    }

    pub fn trace_calls(&self) -> usize {
        self.trace_requests.lock().unwrap().len()
    }

    pub fn installed_harness(&self) -> Option<String> {
        self.harness.lock().unwrap().clone()
    }
}

/// Compile everything successfully once the scripted outcomes run out.
fn default_compile(code: &str) -> CompileOutcome {
    CompileOutcome {
        pass: true,
        report: format!("[Compiled Success Verilog Module]:\n```verilog\n{code}\n```"),
    }
}

#[async_trait]
impl Toolchain for ScriptedToolchain {
    async fn install_harness(&self, harness: &str) -> Result<()> {
        *self.harness.lock().unwrap() = Some(harness.to_string());
        Ok(())
    }

    async fn compile(&self, code: &str) -> Result<CompileOutcome> {
        self.compiled.lock().unwrap().push(code.to_string());
        Ok(self
            .compiles
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| default_compile(code)))
    }

    async fn check_harness(
        &self,
        harness: &str,
        _interface: Option<&str>,
    ) -> Result<CompileOutcome> {
        self.harness_checked.lock().unwrap().push(harness.to_string());
        Ok(self
            .harness_checks
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| default_compile(harness)))
    }

    async fn compile_and_run(&self, code: &str) -> Result<SimOutcome> {
        if self.harness.lock().unwrap().is_none() {
            return Err(RtlgenError::ConfigError(
                "simulation requested before a harness was loaded".into(),
            ));
        }
        self.simulated.lock().unwrap().push(code.to_string());
        self.sims.lock().unwrap().pop_front().ok_or_else(|| {
            RtlgenError::ToolContractViolation(
                "scripted toolchain ran out of simulation outcomes".into(),
            )
        })
    }

    async fn trace(&self, req: &TraceRequest) -> Result<String> {
        self.trace_requests.lock().unwrap().push(req.clone());
        Ok(self
            .traces
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}
