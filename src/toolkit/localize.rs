// src/toolkit/localize.rs

//! Re-localization of compiler diagnostics across a concatenated unit.
//!
//! The simulation unit is the harness followed by the design. Diagnostics
//! pointing past the harness's own line count belong to the candidate and
//! are rewritten into "error sections": a window of source lines around
//! the offending line, annotated inline. Diagnostics pointing into the
//! harness pass through verbatim; the harness is immutable and never
//! edited by this engine.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

fn line_ref_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.sv:(\d+):").expect("static regex"))
}

/// Rewrite raw compiler diagnostics for the concatenated unit.
///
/// - `diagnostics`: everything the compiler printed.
/// - `unit_source`: the concatenated harness + design text the compiler saw.
/// - `harness_lines`: line count of the harness prefix.
/// - `window`: source lines shown before and after an offending line.
pub fn localize_compile_report(
    diagnostics: &str,
    unit_source: &str,
    harness_lines: usize,
    window: usize,
) -> String {
    // One annotation per offending line; a later diagnostic for the same
    // line replaces the earlier text.
    let mut design_errors: BTreeMap<usize, String> = BTreeMap::new();
    let mut passthrough = String::new();

    for content in diagnostics.lines() {
        let captured = line_ref_pattern().captures(content).and_then(|caps| {
            let line: usize = caps.get(1)?.as_str().parse().ok()?;
            let detail_at = caps.get(0)?.end();
            Some((line, content[detail_at..].trim().to_string()))
        });

        match captured {
            Some((line, detail)) if line > harness_lines => {
                design_errors.insert(line, detail);
            }
            _ => {
                passthrough.push_str(content);
                passthrough.push('\n');
            }
        }
    }

    if design_errors.is_empty() {
        return format!("[Compiled Failed Report]\n{passthrough}");
    }

    let mut unit_lines: Vec<String> = unit_source.lines().map(|l| l.to_string()).collect();
    let mut sections = String::new();

    for (section, (line, detail)) in design_errors.iter().enumerate() {
        let idx = line - 1;
        if idx >= unit_lines.len() {
            // Line reference past the unit; fall back to passthrough text.
            passthrough.push_str(&format!("error at line {line}: {detail}\n"));
            continue;
        }

        unit_lines[idx] = format!("{} ## Error line: {} ## ", unit_lines[idx], detail);

        let lo = idx.saturating_sub(window);
        let hi = (idx + window).min(unit_lines.len() - 1);

        sections.push_str(&format!(
            "## Compiled Error Section {} Begin ##\n\n",
            section + 1
        ));
        sections.push_str(&unit_lines[lo..=hi].join("\n"));
        sections.push_str(&format!(
            "\n\n## Compiled Error Section {} End ##\n\n",
            section + 1
        ));
    }

    sections.push_str(&passthrough);
    format!("[Compiled Failed Report]\n{sections}")
}
