// tests/toolkit_report.rs

mod common;
use crate::common::init_tracing;

use rtlgen::config::model::ToolchainSection;
use rtlgen::toolkit::iverilog::IverilogToolchain;
use rtlgen::toolkit::localize::localize_compile_report;
use rtlgen::toolkit::mismatch::extract_mismatch_count;
use rtlgen::toolkit::{module_delimiters_present, Toolchain};
use rtlgen_test_utils::with_timeout;

/// A unit with a 10-line harness prefix and design lines after it.
fn sample_unit() -> String {
    let mut lines: Vec<String> = (1..=10).map(|i| format!("// harness line {i}")).collect();
    for i in 11..=30 {
        lines.push(format!("wire design_line_{i};"));
    }
    lines.join("\n")
}

#[test]
fn design_diagnostics_become_windowed_sections() {
    init_tracing();
    let unit = sample_unit();
    let diagnostics = "test.sv:13: syntax error near 'wire'";

    let report = localize_compile_report(diagnostics, &unit, 10, 5);

    assert!(report.starts_with("[Compiled Failed Report]"));
    assert!(report.contains("## Compiled Error Section 1 Begin ##"));
    assert!(report.contains("## Compiled Error Section 1 End ##"));
    // The annotation lands on the reported line itself.
    assert!(report.contains("wire design_line_13; ## Error line: syntax error near 'wire' ## "));
    // Window of five lines each side: 8 through 18 inclusive.
    assert!(report.contains("// harness line 8"));
    assert!(report.contains("wire design_line_18;"));
    assert!(!report.contains("// harness line 7"));
    assert!(!report.contains("wire design_line_19;"));
}

#[test]
fn harness_diagnostics_pass_through_verbatim() {
    let unit = sample_unit();
    let diagnostics = "test.sv:4: error: harness problem";

    let report = localize_compile_report(diagnostics, &unit, 10, 5);

    assert!(!report.contains("## Compiled Error Section"));
    assert!(report.contains("test.sv:4: error: harness problem"));
}

#[test]
fn mixed_diagnostics_split_between_sections_and_passthrough() {
    let unit = sample_unit();
    let diagnostics =
        "test.sv:4: error: harness problem\ntest.sv:20: error: design problem\nsorry: giving up";

    let report = localize_compile_report(diagnostics, &unit, 10, 5);

    assert!(report.contains("## Compiled Error Section 1 Begin ##"));
    assert!(report.contains("wire design_line_20; ## Error line: error: design problem ## "));
    assert!(report.contains("test.sv:4: error: harness problem"));
    assert!(report.contains("sorry: giving up"));
}

#[test]
fn window_clamps_at_unit_boundaries() {
    let unit = sample_unit();
    let diagnostics = "test.sv:30: error: at the very end";

    let report = localize_compile_report(diagnostics, &unit, 10, 5);

    assert!(report.contains("wire design_line_30; ## Error line: error: at the very end ## "));
    assert!(report.contains("wire design_line_25;"));
}

#[test]
fn mismatch_count_from_mismatches_line() {
    let report = "some noise\nMismatches: 5 in 100 samples\n";
    assert_eq!(extract_mismatch_count(report), Some(5));
}

#[test]
fn mismatch_count_from_hint_line() {
    let report = "Hint: Output 'q' has no mismatches.\nHint: Total mismatched samples is 3 out of 10 samples\n";
    assert_eq!(extract_mismatch_count(report), Some(3));
}

#[test]
fn zero_mismatches_is_a_pass_signal() {
    assert_eq!(
        extract_mismatch_count("Mismatches: 0 in 439 samples"),
        Some(0)
    );
}

#[test]
fn missing_summary_line_is_none() {
    assert_eq!(extract_mismatch_count("simulation ran, no summary"), None);
    // Indented lines do not count; the summary is anchored at line start.
    assert_eq!(
        extract_mismatch_count("  Mismatches: 5 in 100 samples"),
        None
    );
}

#[test]
fn delimiter_check_keys_on_endmodule() {
    assert!(module_delimiters_present("module m;\nendmodule"));
    assert!(!module_delimiters_present("module m;\n// unfinished"));
}

#[tokio::test]
async fn incomplete_candidate_short_circuits_the_real_adapter() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let mut opts = ToolchainSection::default();
    // A command that must never run; the structural check fires first.
    opts.compiler = "/nonexistent/iverilog".to_string();
    let toolchain = IverilogToolchain::new(dir.path(), opts).unwrap();

    let outcome = with_timeout(toolchain.compile("module TopModule(input a);"))
        .await
        .unwrap();

    assert!(!outcome.pass);
    assert!(outcome.report.contains("the module is not completed"));

    // Same input, unchanged adapter state: identical outcome.
    let again = with_timeout(toolchain.compile("module TopModule(input a);"))
        .await
        .unwrap();
    assert_eq!(outcome, again);
}

#[tokio::test]
async fn simulation_without_a_harness_is_a_config_error() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let toolchain = IverilogToolchain::new(dir.path(), ToolchainSection::default()).unwrap();

    let err = with_timeout(toolchain.compile_and_run("module m;\nendmodule"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("harness"));
}

#[test]
fn localization_is_idempotent_over_the_same_diagnostics() {
    let unit = sample_unit();
    let diagnostics = "test.sv:15: error: repeatable";

    let first = localize_compile_report(diagnostics, &unit, 10, 5);
    let second = localize_compile_report(diagnostics, &unit, 10, 5);
    assert_eq!(first, second);
}
