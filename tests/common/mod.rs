use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

use rtlgen::graph::{KnowledgeGraph, NodeType, Relationship};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// A minimal complete module, used wherever a test needs code that passes
/// the structural check.
#[allow(dead_code)]
pub const PASSTHROUGH_MODULE: &str =
    "module TopModule(\n  input in,\n  output out\n);\nassign out = in;\nendmodule\n";

/// A minimal harness with the terminal delimiter.
#[allow(dead_code)]
pub const MINIMAL_HARNESS: &str =
    "module tb();\n  initial $display(\"Mismatches: 0 in 100 samples\");\nendmodule\n";

/// Shift-register design graph used across graph tests:
/// one plan, two signals, two FSM states with a transition, one example.
#[allow(dead_code)]
pub fn shift_register_graph() -> KnowledgeGraph {
    let mut kg = KnowledgeGraph::new();
    kg.insert_node("plan_shift", NodeType::Plan, "implement the shift register");
    kg.insert_node("clk", NodeType::Signal, "posedge clock");
    kg.insert_node("q", NodeType::Signal, "serial output");
    kg.insert_node("IDLE", NodeType::FsmState, "waiting for enable");
    kg.insert_node("SHIFT", NodeType::FsmState, "shifting every cycle");
    kg.insert_node("ex1", NodeType::Example, "in=1011 -> q=1101");

    kg.add_edge("plan_shift", "clk", Relationship::Implements).unwrap();
    kg.add_edge("plan_shift", "q", Relationship::Implements).unwrap();
    kg.add_edge("plan_shift", "IDLE", Relationship::Implements).unwrap();
    kg.add_edge("IDLE", "SHIFT", Relationship::StateTransition).unwrap();
    kg.add_edge("plan_shift", "ex1", Relationship::Examples).unwrap();
    kg
}
