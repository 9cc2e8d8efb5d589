// src/toolkit/mismatch.rs

//! Mismatch-count extraction from a simulation report.
//!
//! A conforming harness emits exactly one of two summary lines at
//! completion:
//!
//! ```text
//! Mismatches: 5 in 100 samples
//! Hint: Total mismatched samples is 3 out of 10 samples
//! ```
//!
//! Absence of both is a harness contract violation, handled by the
//! caller as fatal.

use std::sync::OnceLock;

use regex::Regex;

fn mismatches_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^Mismatches:\s+(\d+)").expect("static regex"))
}

fn hint_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^Hint: Total mismatched samples is (\d+)\b").expect("static regex")
    })
}

/// Scan `report` for the first recognized summary line and return its
/// integer mismatch count. `None` means no summary line was found.
pub fn extract_mismatch_count(report: &str) -> Option<u64> {
    for line in report.lines() {
        if let Some(caps) = mismatches_pattern().captures(line) {
            return caps[1].parse().ok();
        }
        if let Some(caps) = hint_pattern().captures(line) {
            return caps[1].parse().ok();
        }
    }
    None
}
