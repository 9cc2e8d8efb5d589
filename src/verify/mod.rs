// src/verify/mod.rs

//! Simulation-driven verification and debugging.
//!
//! Mirrors the synthesis split: [`core::VerifyCore`] is the pure state
//! machine (harness acceptance, simulate/diagnose/trace cycle, round
//! accounting), [`driver::run_verification`] executes its commands, and
//! [`harness`] runs the draft-and-review sub-loop that produces harness
//! candidates for operator sign-off.

pub mod core;
pub mod driver;
pub mod harness;

pub use core::{VerifyCommand, VerifyCore, VerifyEvent, VerifyOutcome};
pub use driver::{run_verification, VerifyReport};
