// tests/verification_loop.rs

mod common;
use crate::common::{init_tracing, MINIMAL_HARNESS, PASSTHROUGH_MODULE};

use rtlgen::reason::{DebugAction, HarnessVerdict, ReviewVerdict};
use rtlgen::toolkit::{CompileOutcome, SimOutcome, TraceRequest};
use rtlgen::verify::{run_verification, VerifyOutcome};
use rtlgen_test_utils::scripted_reasoner::{ScriptedOperator, ScriptedReasoner};
use rtlgen_test_utils::scripted_toolchain::ScriptedToolchain;
use rtlgen_test_utils::with_timeout;

const SPEC: &str = "Passthrough: out follows in combinationally.";

fn passing_sim() -> SimOutcome {
    SimOutcome {
        compiled: true,
        functional_pass: true,
        report: "[Compiled Success]\n[Function Check Success]\nMismatches: 0 in 100 samples"
            .to_string(),
    }
}

fn failing_sim(report: &str) -> SimOutcome {
    SimOutcome {
        compiled: true,
        functional_pass: false,
        report: report.to_string(),
    }
}

#[tokio::test]
async fn clean_pass_verifies_on_first_simulation() {
    init_tracing();
    let reasoner = ScriptedReasoner::new().push_harness_draft(MINIMAL_HARNESS);
    let operator = ScriptedOperator::new();
    let toolchain = ScriptedToolchain::new().push_sim(passing_sim());

    let report = with_timeout(run_verification(
        &reasoner,
        &operator,
        &toolchain,
        SPEC,
        None,
        PASSTHROUGH_MODULE.to_string(),
        None,
        40,
    ))
    .await
    .unwrap();

    assert_eq!(report.outcome, VerifyOutcome::Pass);
    assert_eq!(report.code, PASSTHROUGH_MODULE);
    assert_eq!(report.diagnoses, 0);
    assert_eq!(operator.approval_calls(), 1);
    assert_eq!(toolchain.installed_harness().as_deref(), Some(MINIMAL_HARNESS));
}

#[tokio::test]
async fn operator_rejection_restarts_harness_synthesis_with_feedback() {
    init_tracing();
    let reasoner = ScriptedReasoner::new()
        .push_harness_draft(MINIMAL_HARNESS)
        .push_harness_draft(MINIMAL_HARNESS);
    let operator = ScriptedOperator::new()
        .push_verdict(HarnessVerdict::Reject("no reset coverage".to_string()));
    let toolchain = ScriptedToolchain::new().push_sim(passing_sim());

    let report = with_timeout(run_verification(
        &reasoner,
        &operator,
        &toolchain,
        SPEC,
        None,
        PASSTHROUGH_MODULE.to_string(),
        None,
        40,
    ))
    .await
    .unwrap();

    assert_eq!(report.outcome, VerifyOutcome::Pass);
    assert_eq!(operator.approval_calls(), 2);

    let requests = reasoner.harness_requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].feedback.is_none());
    assert_eq!(requests[1].feedback.as_deref(), Some("no reset coverage"));
}

#[tokio::test]
async fn revision_after_diagnosis_is_resimulated() {
    init_tracing();
    let revised = "module TopModule(input in, output out);\nassign out = in;\nendmodule\n";
    let reasoner = ScriptedReasoner::new()
        .push_harness_draft(MINIMAL_HARNESS)
        .push_action(DebugAction::ReviseCode(revised.to_string()));
    let operator = ScriptedOperator::new();
    let toolchain = ScriptedToolchain::new()
        .push_sim(failing_sim("Mismatches: 3 in 100 samples"))
        .push_sim(passing_sim());

    let report = with_timeout(run_verification(
        &reasoner,
        &operator,
        &toolchain,
        SPEC,
        None,
        PASSTHROUGH_MODULE.to_string(),
        None,
        40,
    ))
    .await
    .unwrap();

    assert_eq!(report.outcome, VerifyOutcome::Pass);
    assert_eq!(report.code, revised);
    assert_eq!(report.diagnoses, 1);
    assert_eq!(toolchain.sim_calls(), 2);
}

#[tokio::test]
async fn waveform_inspection_attaches_the_trace_to_the_next_diagnosis() {
    init_tracing();
    let reasoner = ScriptedReasoner::new()
        .push_harness_draft(MINIMAL_HARNESS)
        .push_action(DebugAction::InspectWaveform(TraceRequest {
            signals: vec!["tb.clk".to_string(), "tb.out".to_string()],
            start_time: 100,
            end_time: 200,
        }))
        .push_action(DebugAction::ReviseCode(PASSTHROUGH_MODULE.to_string()));
    let operator = ScriptedOperator::new();
    let toolchain = ScriptedToolchain::new()
        .push_sim(failing_sim("Mismatches: 3 in 100 samples"))
        .push_trace("time  150\ntb.clk  0\ntb.out  x")
        .push_sim(passing_sim());

    let report = with_timeout(run_verification(
        &reasoner,
        &operator,
        &toolchain,
        SPEC,
        None,
        PASSTHROUGH_MODULE.to_string(),
        None,
        40,
    ))
    .await
    .unwrap();

    assert_eq!(report.outcome, VerifyOutcome::Pass);
    assert_eq!(report.diagnoses, 2);
    assert_eq!(toolchain.trace_calls(), 1);

    let requests = reasoner.diagnose_requests.lock().unwrap();
    assert!(requests[0].trace.is_none());
    let trace = requests[1].trace.as_deref().unwrap();
    assert!(trace.contains("tb.out"));
    // Same report, now with waveform evidence.
    assert_eq!(requests[0].report, requests[1].report);
}

#[tokio::test]
async fn exhausted_budget_fails_with_best_known_code() {
    init_tracing();
    let reasoner = ScriptedReasoner::new()
        .push_harness_draft(MINIMAL_HARNESS)
        .with_default_action(DebugAction::ReviseCode(PASSTHROUGH_MODULE.to_string()));
    let operator = ScriptedOperator::new();
    let mut toolchain = ScriptedToolchain::new();
    for _ in 0..4 {
        toolchain = toolchain.push_sim(failing_sim("Mismatches: 7 in 100 samples"));
    }

    let report = with_timeout(run_verification(
        &reasoner,
        &operator,
        &toolchain,
        SPEC,
        None,
        PASSTHROUGH_MODULE.to_string(),
        None,
        3,
    ))
    .await
    .unwrap();

    assert_eq!(report.outcome, VerifyOutcome::Fail);
    assert_eq!(report.diagnoses, 3);
    // The last compiled candidate is kept for the best-effort artifact.
    assert_eq!(report.code, PASSTHROUGH_MODULE);
}

#[tokio::test]
async fn structurally_incomplete_revision_skips_the_simulator() {
    init_tracing();
    let reasoner = ScriptedReasoner::new()
        .push_harness_draft(MINIMAL_HARNESS)
        .push_action(DebugAction::ReviseCode("module TopModule(".to_string()))
        .push_action(DebugAction::ReviseCode(PASSTHROUGH_MODULE.to_string()));
    let operator = ScriptedOperator::new();
    let toolchain = ScriptedToolchain::new()
        .push_sim(failing_sim("Mismatches: 3 in 100 samples"))
        .push_sim(passing_sim());

    let report = with_timeout(run_verification(
        &reasoner,
        &operator,
        &toolchain,
        SPEC,
        None,
        PASSTHROUGH_MODULE.to_string(),
        None,
        40,
    ))
    .await
    .unwrap();

    assert_eq!(report.outcome, VerifyOutcome::Pass);
    // Two simulations only; the incomplete revision went back to
    // diagnosis with the corrective message instead.
    assert_eq!(toolchain.sim_calls(), 2);
    let requests = reasoner.diagnose_requests.lock().unwrap();
    assert!(requests[1].report.contains("the module is not completed"));
}

#[tokio::test]
async fn pre_supplied_harness_skips_synthesis_and_approval() {
    init_tracing();
    let reasoner = ScriptedReasoner::new();
    let operator = ScriptedOperator::new();
    let toolchain = ScriptedToolchain::new().push_sim(passing_sim());

    let report = with_timeout(run_verification(
        &reasoner,
        &operator,
        &toolchain,
        SPEC,
        None,
        PASSTHROUGH_MODULE.to_string(),
        Some(MINIMAL_HARNESS.to_string()),
        40,
    ))
    .await
    .unwrap();

    assert_eq!(report.outcome, VerifyOutcome::Pass);
    assert_eq!(operator.approval_calls(), 0);
    assert!(reasoner.harness_requests.lock().unwrap().is_empty());
    assert_eq!(report.harness.as_deref(), Some(MINIMAL_HARNESS));
}

#[tokio::test]
async fn harness_review_revision_feeds_back_before_the_operator_sees_it() {
    init_tracing();
    let reasoner = ScriptedReasoner::new()
        .push_harness_draft(MINIMAL_HARNESS)
        .push_harness_review(ReviewVerdict::Revise("missing clock gen".to_string()))
        .push_harness_draft(MINIMAL_HARNESS);
    let operator = ScriptedOperator::new();
    let toolchain = ScriptedToolchain::new().push_sim(passing_sim());

    let report = with_timeout(run_verification(
        &reasoner,
        &operator,
        &toolchain,
        SPEC,
        None,
        PASSTHROUGH_MODULE.to_string(),
        None,
        40,
    ))
    .await
    .unwrap();

    assert_eq!(report.outcome, VerifyOutcome::Pass);
    // Two drafts inside one sub-loop call, one operator approval.
    assert_eq!(reasoner.harness_requests.lock().unwrap().len(), 2);
    assert_eq!(operator.approval_calls(), 1);
    assert_eq!(
        reasoner.harness_requests.lock().unwrap()[1].feedback.as_deref(),
        Some("missing clock gen")
    );
}

#[tokio::test]
async fn non_compiling_harness_draft_is_redrafted_before_review() {
    init_tracing();
    // Delimiters present, so only the compile check can catch it.
    let broken = "module tb();\ninitial begin $display(oops; end\nendmodule\n";
    let reasoner = ScriptedReasoner::new()
        .push_harness_draft(broken)
        .push_harness_draft(MINIMAL_HARNESS);
    let operator = ScriptedOperator::new();
    let toolchain = ScriptedToolchain::new()
        .push_harness_check(CompileOutcome {
            pass: false,
            report: "[Compiled Failed Report]\ntest.sv:2: syntax error".to_string(),
        })
        .push_sim(passing_sim());

    let report = with_timeout(run_verification(
        &reasoner,
        &operator,
        &toolchain,
        SPEC,
        None,
        PASSTHROUGH_MODULE.to_string(),
        None,
        40,
    ))
    .await
    .unwrap();

    assert_eq!(report.outcome, VerifyOutcome::Pass);
    assert_eq!(toolchain.harness_check_calls(), 2);
    // The broken draft never reached the operator or the simulator.
    assert_eq!(operator.approval_calls(), 1);
    assert_eq!(toolchain.installed_harness().as_deref(), Some(MINIMAL_HARNESS));
    assert_eq!(toolchain.sim_calls(), 1);
    assert_eq!(report.diagnoses, 0);

    let requests = reasoner.harness_requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    let feedback = requests[1].feedback.as_deref().unwrap();
    assert!(feedback.contains("syntax error"));
}
