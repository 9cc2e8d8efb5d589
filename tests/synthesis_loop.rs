// tests/synthesis_loop.rs

mod common;
use crate::common::{init_tracing, PASSTHROUGH_MODULE};

use rtlgen::reason::ReviewVerdict;
use rtlgen::synth::{run_synthesis, SynthOutcome};
use rtlgen::toolkit::CompileOutcome;
use rtlgen_test_utils::scripted_reasoner::ScriptedReasoner;
use rtlgen_test_utils::scripted_toolchain::ScriptedToolchain;
use rtlgen_test_utils::with_timeout;

#[tokio::test]
async fn empty_task_queue_completes_with_zero_drafts() {
    init_tracing();
    let reasoner = ScriptedReasoner::new();
    let toolchain = ScriptedToolchain::new();

    let report = with_timeout(run_synthesis(&reasoner, &toolchain, Vec::new(), 200))
        .await
        .unwrap();

    assert_eq!(report.outcome, SynthOutcome::Complete);
    assert_eq!(report.drafts, 0);
    assert_eq!(reasoner.draft_calls(), 0);
    assert_eq!(toolchain.compile_calls(), 0);
}

#[tokio::test]
async fn missing_delimiter_never_reaches_the_compiler() {
    init_tracing();
    let reasoner = ScriptedReasoner::new()
        .push_draft("module TopModule(input in, output out);")
        .push_draft(PASSTHROUGH_MODULE)
        .with_default_review(ReviewVerdict::Approve);
    let toolchain = ScriptedToolchain::new();

    let report = with_timeout(run_synthesis(
        &reasoner,
        &toolchain,
        vec!["wire it through".to_string()],
        200,
    ))
    .await
    .unwrap();

    assert_eq!(report.outcome, SynthOutcome::Complete);
    // Two drafts, but only the structurally complete one was compiled.
    assert_eq!(report.drafts, 2);
    assert_eq!(toolchain.compile_calls(), 1);

    // The retry carried the corrective message.
    let requests = reasoner.draft_requests.lock().unwrap();
    assert!(requests[0].feedback.is_none());
    let feedback = requests[1].feedback.as_deref().unwrap();
    assert!(feedback.contains("the module is not completed"));
}

#[tokio::test]
async fn compile_failure_feeds_the_report_back() {
    init_tracing();
    let reasoner = ScriptedReasoner::new()
        .with_default_draft(PASSTHROUGH_MODULE)
        .with_default_review(ReviewVerdict::Approve);
    let toolchain = ScriptedToolchain::new().push_compile(CompileOutcome {
        pass: false,
        report: "[Compiled Failed Report]\nsyntax error".to_string(),
    });

    let report = with_timeout(run_synthesis(
        &reasoner,
        &toolchain,
        vec!["one task".to_string()],
        200,
    ))
    .await
    .unwrap();

    assert_eq!(report.outcome, SynthOutcome::Complete);
    assert_eq!(toolchain.compile_calls(), 2);

    let requests = reasoner.draft_requests.lock().unwrap();
    let feedback = requests[1].feedback.as_deref().unwrap();
    assert!(feedback.contains("syntax error"));
}

#[tokio::test]
async fn review_rejection_retries_then_advances() {
    init_tracing();
    let reasoner = ScriptedReasoner::new()
        .with_default_draft(PASSTHROUGH_MODULE)
        .push_review(ReviewVerdict::Revise("output is inverted".to_string()))
        .with_default_review(ReviewVerdict::Approve);
    let toolchain = ScriptedToolchain::new();

    let report = with_timeout(run_synthesis(
        &reasoner,
        &toolchain,
        vec!["task one".to_string(), "task two".to_string()],
        200,
    ))
    .await
    .unwrap();

    assert_eq!(report.outcome, SynthOutcome::Complete);
    // task one drafted twice (revision), task two once.
    assert_eq!(report.drafts, 3);

    let requests = reasoner.draft_requests.lock().unwrap();
    assert_eq!(
        requests[1].feedback.as_deref(),
        Some("output is inverted")
    );
    assert_eq!(requests[1].task, "task one");
    assert_eq!(requests[2].task, "task two");
    assert!(requests[2].feedback.is_none());
}

#[tokio::test]
async fn interface_is_captured_from_first_successful_compile() {
    init_tracing();
    let reasoner = ScriptedReasoner::new()
        .with_default_draft(PASSTHROUGH_MODULE)
        .with_default_review(ReviewVerdict::Approve);
    let toolchain = ScriptedToolchain::new();

    let report = with_timeout(run_synthesis(
        &reasoner,
        &toolchain,
        vec!["one task".to_string()],
        200,
    ))
    .await
    .unwrap();

    let iface = report.interface.unwrap();
    assert!(iface.starts_with("module TopModule"));
    assert!(iface.ends_with(");"));
}

#[tokio::test]
async fn exhausted_budget_ends_incomplete_with_accumulated_code() {
    init_tracing();
    // Approve the first task, then revise forever.
    let reasoner = ScriptedReasoner::new()
        .with_default_draft(PASSTHROUGH_MODULE)
        .push_review(ReviewVerdict::Approve)
        .with_default_review(ReviewVerdict::Revise("still wrong".to_string()));
    let toolchain = ScriptedToolchain::new();

    let report = with_timeout(run_synthesis(
        &reasoner,
        &toolchain,
        vec!["easy task".to_string(), "impossible task".to_string()],
        10,
    ))
    .await
    .unwrap();

    assert_eq!(report.outcome, SynthOutcome::Incomplete);
    assert_eq!(report.drafts, 10);
    // Code from the approved task survives.
    assert_eq!(report.code, PASSTHROUGH_MODULE);
}
