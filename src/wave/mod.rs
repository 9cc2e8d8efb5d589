// src/wave/mod.rs

//! Waveform-trace extraction.
//!
//! - [`extract`] streams a value-change-dump file and samples requested
//!   signals inside a time window, optionally gated on a clock's
//!   inactive level.
//! - [`table`] renders the sampled window as an aligned text table.

pub mod extract;
pub mod table;

pub use extract::extract_traces;
pub use table::TraceTable;
