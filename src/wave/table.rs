// src/wave/table.rs

//! Tabular rendering of an extracted trace window.

/// A windowed, clock-gated signal table.
///
/// `rows` is parallel to the requested signal order; each row holds one
/// hexadecimal value per retained time point.
#[derive(Debug, Clone, Default)]
pub struct TraceTable {
    /// Unresolved-signal errors, reported inline without aborting the
    /// rest of the extraction.
    pub errors: Vec<String>,
    /// Retained sample times, ascending.
    pub times: Vec<u64>,
    /// `(signal name, hex values)` per resolved signal.
    pub rows: Vec<(String, Vec<String>)>,
}

impl TraceTable {
    /// Render errors, a header row of time points and one row per signal,
    /// all columns aligned to the widest cell.
    pub fn render(&self) -> String {
        let mut output: Vec<String> = self.errors.clone();
        output.push(String::new());

        if self.rows.is_empty() {
            return output.join("\n");
        }

        let first_col_width = self
            .rows
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max("time".len());

        let max_value_width = self
            .rows
            .iter()
            .flat_map(|(_, values)| values.iter().map(|v| v.len()))
            .max()
            .unwrap_or(0);

        let max_time_width = self
            .times
            .iter()
            .map(|t| t.to_string().len())
            .max()
            .unwrap_or(0);

        let col_width = max_value_width.max(max_time_width) + 2;

        let mut header = format!("{:<first_col_width$}", "time");
        for t in &self.times {
            header.push_str(&format!("{:>col_width$}", t));
        }
        output.push(header);

        for (name, values) in &self.rows {
            let mut row = format!("{name:<first_col_width$}");
            for value in values {
                row.push_str(&format!("{value:>col_width$}"));
            }
            output.push(row);
        }

        output.join("\n")
    }
}
