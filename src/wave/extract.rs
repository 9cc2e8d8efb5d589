// src/wave/extract.rs

//! Streaming extraction of signal samples from a value-change dump.
//!
//! The header is parsed once to resolve requested hierarchical names to
//! identifier codes; the value stream is then consumed token-wise. A
//! sample is retained for a time point only if some signal changed there,
//! the point lies inside the requested window and, when a clock is
//! given, the clock sits at its inactive level at that instant (the
//! value stable going into the next active edge, not the edge itself).

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::debug;
use vcd_ng::{FFValueChange, FastFlow, FastFlowToken, ScopeItem};

use crate::errors::Result;
use crate::wave::table::TraceTable;

/// Extract a windowed sample table from the trace at `path`.
///
/// `signals` are hierarchical names without bit-select suffixes; names
/// that do not resolve are recorded as errors while extraction continues
/// for the rest. The window is `[start, start + window]` in raw trace
/// time units.
pub fn extract_traces(
    path: &Path,
    signals: &[String],
    start: u64,
    window: u64,
    clock: Option<&str>,
) -> Result<TraceTable> {
    // Pass 1: definitions. Map base reference names to id codes.
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(65536, file);
    let mut parser = vcd_ng::Parser::new(&mut reader);
    let header = parser.parse_header()?;

    let mut defined: HashMap<String, (u64, u32)> = HashMap::new();
    collect_vars(&header.items, "", &mut defined);

    let mut table = TraceTable::default();
    let mut tracked: Vec<(String, u64, u32)> = Vec::new();

    for sig in signals {
        match defined.get(sig.as_str()) {
            Some(&(code, size)) => tracked.push((sig.clone(), code, size)),
            None => table
                .errors
                .push(format!("Error: Signal '{sig}' not found in waveform.")),
        }
    }

    let clock_code = clock.and_then(|c| defined.get(c).map(|&(code, _)| code));
    if let Some(c) = clock {
        if clock_code.is_none() {
            debug!(clock = %c, "clock signal not present in trace; sampling ungated");
        }
    }

    // Pass 2: value stream.
    let mut values: HashMap<u64, Vec<u8>> = HashMap::new();
    let mut samples: Vec<(u64, Vec<String>)> = Vec::new();
    let mut current_time: Option<u64> = None;
    let mut changed = false;

    let mut flow = FastFlow::new(File::open(path)?, 65536);
    while let Some(token) = flow.next_token()? {
        match token {
            FastFlowToken::Timestamp(t) => {
                if Some(t) == current_time {
                    continue;
                }
                if let Some(prev) = current_time {
                    maybe_sample(
                        prev, start, window, changed, clock_code, &values, &tracked, &mut samples,
                    );
                }
                current_time = Some(t);
                changed = false;
            }
            FastFlowToken::Value(FFValueChange { id, bits }) => {
                changed = true;
                values.insert(id.0, bits.to_vec());
            }
        }
    }
    if let Some(prev) = current_time {
        maybe_sample(
            prev, start, window, changed, clock_code, &values, &tracked, &mut samples,
        );
    }

    table.times = samples.iter().map(|(t, _)| *t).collect();
    table.rows = tracked
        .iter()
        .enumerate()
        .map(|(i, (name, _, _))| {
            let column = samples.iter().map(|(_, row)| row[i].clone()).collect();
            (name.clone(), column)
        })
        .collect();

    Ok(table)
}

/// Retain the just-finished time point if it qualifies.
#[allow(clippy::too_many_arguments)]
fn maybe_sample(
    time: u64,
    start: u64,
    window: u64,
    changed: bool,
    clock_code: Option<u64>,
    values: &HashMap<u64, Vec<u8>>,
    tracked: &[(String, u64, u32)],
    samples: &mut Vec<(u64, Vec<String>)>,
) {
    if !changed || time < start || time > start + window {
        return;
    }

    if let Some(code) = clock_code {
        let inactive = values
            .get(&code)
            .map(|bits| bits.as_slice() == b"0")
            .unwrap_or(false);
        if !inactive {
            return;
        }
    }

    let row = tracked
        .iter()
        .map(|&(_, code, size)| match values.get(&code) {
            Some(bits) => bits_to_hex(bits, size),
            None => "x".to_string(),
        })
        .collect();
    samples.push((time, row));
}

fn collect_vars(items: &[ScopeItem], prefix: &str, out: &mut HashMap<String, (u64, u32)>) {
    for item in items {
        match item {
            ScopeItem::Scope(scope) => {
                let nested = if prefix.is_empty() {
                    scope.identifier.to_string()
                } else {
                    format!("{prefix}.{}", scope.identifier)
                };
                collect_vars(&scope.children[..], &nested, out);
            }
            ScopeItem::Var(var) => {
                let base = var
                    .reference
                    .split('[')
                    .next()
                    .unwrap_or(var.reference.as_str())
                    .trim();
                let full = if prefix.is_empty() {
                    base.to_string()
                } else {
                    format!("{prefix}.{base}")
                };
                // Later definitions with the same base name win.
                out.insert(full, (var.code.0, var.size));
            }
            _ => {}
        }
    }
}

/// Convert a binary value string to lowercase hexadecimal.
///
/// Values shorter than the declared width are left-extended VCD-style
/// (with the leading bit when it is x/z, with zero otherwise). Any x or
/// z anywhere collapses the cell to that letter.
fn bits_to_hex(bits: &[u8], size: u32) -> String {
    let mut full = Vec::with_capacity(size as usize);
    if (bits.len() as u32) < size {
        let fill = match bits.first() {
            Some(&b @ (b'x' | b'X' | b'z' | b'Z')) => b,
            _ => b'0',
        };
        full.resize(size as usize - bits.len(), fill);
    }
    full.extend_from_slice(bits);

    if full
        .iter()
        .any(|&b| matches!(b, b'x' | b'X'))
    {
        return "x".to_string();
    }
    if full
        .iter()
        .any(|&b| matches!(b, b'z' | b'Z'))
    {
        return "z".to_string();
    }

    // Nibble-wise from the least-significant end, then strip leading zeros.
    let mut digits = Vec::new();
    let mut chunk_end = full.len();
    while chunk_end > 0 {
        let chunk_start = chunk_end.saturating_sub(4);
        let mut nibble = 0u8;
        for &b in &full[chunk_start..chunk_end] {
            nibble = (nibble << 1) | u8::from(b == b'1');
        }
        digits.push(std::char::from_digit(nibble as u32, 16).unwrap_or('0'));
        chunk_end = chunk_start;
    }

    let hex: String = digits
        .into_iter()
        .rev()
        .collect::<String>()
        .trim_start_matches('0')
        .to_string();

    if hex.is_empty() {
        "0".to_string()
    } else {
        hex
    }
}
