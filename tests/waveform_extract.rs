// tests/waveform_extract.rs

mod common;
use crate::common::init_tracing;

use std::io::Write;

use rtlgen::wave::extract_traces;

/// Clock toggling every 5 ns: high at 0/10/20/30, low at 5/15/25/35.
/// `count` changes at 15, `out` goes x at 25, `bus` is written short.
const SAMPLE_VCD: &str = r#"$timescale 1ns $end
$scope module tb $end
$var wire 1 ! clk $end
$var wire 4 " count [3:0] $end
$var wire 8 $ bus $end
$scope module dut $end
$var wire 1 # out $end
$upscope $end
$upscope $end
$enddefinitions $end
#0
1!
b0000 "
b0 $
0#
#5
0!
#10
1!
#15
0!
b1010 "
b11 $
#20
1!
#25
0!
x#
#30
1!
#35
0!
"#;

fn write_vcd(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn clock_gated_window_retains_low_phase_samples_only() {
    init_tracing();
    let file = write_vcd(SAMPLE_VCD);
    let signals = vec!["tb.clk".to_string(), "tb.count".to_string()];

    let table = extract_traces(file.path(), &signals, 10, 20, Some("tb.clk")).unwrap();

    // Changes inside [10, 30] with the clock low: 15 and 25. The edges
    // at 10/20/30 land on the clock's high phase; 35 is past the window.
    assert_eq!(table.times, vec![15, 25]);
    assert!(table.errors.is_empty());

    assert_eq!(table.rows[0].0, "tb.clk");
    assert_eq!(table.rows[0].1, vec!["0", "0"]);
    assert_eq!(table.rows[1].0, "tb.count");
    assert_eq!(table.rows[1].1, vec!["a", "a"]);
}

#[test]
fn ungated_extraction_keeps_every_changed_point_in_window() {
    let file = write_vcd(SAMPLE_VCD);
    let signals = vec!["tb.clk".to_string()];

    let table = extract_traces(file.path(), &signals, 10, 20, None).unwrap();

    assert_eq!(table.times, vec![10, 15, 20, 25, 30]);
}

#[test]
fn x_values_collapse_the_cell() {
    let file = write_vcd(SAMPLE_VCD);
    let signals = vec!["tb.dut.out".to_string()];

    let table = extract_traces(file.path(), &signals, 10, 20, Some("tb.clk")).unwrap();

    // out is 0 at 15, x from 25 on.
    assert_eq!(table.rows[0].1, vec!["0", "x"]);
}

#[test]
fn short_vector_writes_are_left_extended_with_zero() {
    let file = write_vcd(SAMPLE_VCD);
    let signals = vec!["tb.bus".to_string()];

    let table = extract_traces(file.path(), &signals, 10, 20, Some("tb.clk")).unwrap();

    // `b11` into an 8-bit signal reads back as hex 3.
    assert_eq!(table.rows[0].1, vec!["3", "3"]);
}

#[test]
fn unresolved_signals_become_inline_errors() {
    let file = write_vcd(SAMPLE_VCD);
    let signals = vec!["tb.clk".to_string(), "tb.missing".to_string()];

    let table = extract_traces(file.path(), &signals, 10, 20, Some("tb.clk")).unwrap();

    assert_eq!(
        table.errors,
        vec!["Error: Signal 'tb.missing' not found in waveform.".to_string()]
    );
    // Extraction continues for the resolved signal.
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].0, "tb.clk");
}

#[test]
fn rendered_table_aligns_names_times_and_values() {
    let file = write_vcd(SAMPLE_VCD);
    let signals = vec!["tb.clk".to_string(), "tb.count".to_string()];

    let table = extract_traces(file.path(), &signals, 10, 20, Some("tb.clk")).unwrap();
    let rendered = table.render();

    let lines: Vec<&str> = rendered.lines().filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("time"));
    assert!(lines[0].contains("15"));
    assert!(lines[0].contains("25"));
    assert!(lines[1].starts_with("tb.clk"));
    assert!(lines[2].starts_with("tb.count"));
    // Uniform column widths: every row ends at the same column.
    assert_eq!(lines[0].len(), lines[1].len());
    assert_eq!(lines[1].len(), lines[2].len());
}

#[test]
fn missing_bit_select_suffix_still_resolves_the_base_name() {
    let file = write_vcd(SAMPLE_VCD);
    // `count` is declared as `count [3:0]`; the base name resolves.
    let signals = vec!["tb.count".to_string()];

    let table = extract_traces(file.path(), &signals, 0, 40, None).unwrap();
    assert!(table.errors.is_empty());
    assert!(!table.times.is_empty());
}
