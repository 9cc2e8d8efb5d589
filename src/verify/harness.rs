// src/verify/harness.rs

//! Harness draft-and-review sub-loop.
//!
//! Produces one harness candidate per call: draft, structural check,
//! compile check against the design interface, collaborator review,
//! retry with feedback. The candidate still needs operator sign-off;
//! that lives in the outer loop so a rejection can restart this one
//! with the operator's reason.

use tracing::{debug, warn};

use crate::errors::Result;
use crate::reason::{HarnessRequest, Reasoner, ReviewVerdict};
use crate::toolkit::{incomplete_module_message, module_delimiters_present, Toolchain};

/// Draft a harness until it compiles, review approves it, or `attempts`
/// run out.
///
/// On exhaustion the last draft is returned anyway; the operator gets
/// the final say either way.
pub async fn synthesize_harness(
    reasoner: &dyn Reasoner,
    toolchain: &dyn Toolchain,
    spec: &str,
    interface: Option<&str>,
    feedback: Option<String>,
    attempts: u32,
) -> Result<String> {
    let mut feedback = feedback;
    let mut last_draft = String::new();

    for attempt in 0..attempts {
        let request = HarnessRequest {
            spec: spec.to_string(),
            interface: interface.map(str::to_string),
            feedback: feedback.take(),
        };
        let draft = reasoner.draft_harness(&request).await?;

        if !module_delimiters_present(&draft) {
            debug!(attempt, "harness draft rejected structurally");
            feedback = Some(incomplete_module_message(&draft));
            last_draft = draft;
            continue;
        }

        let check = toolchain.check_harness(&draft, interface).await?;
        if !check.pass {
            debug!(attempt, "harness draft failed to compile");
            feedback = Some(check.report);
            last_draft = draft;
            continue;
        }

        match reasoner.review_harness(&draft, spec).await? {
            ReviewVerdict::Approve => return Ok(draft),
            ReviewVerdict::Revise(reason) => {
                debug!(attempt, "harness draft sent back for revision");
                feedback = Some(reason);
                last_draft = draft;
            }
        }
    }

    warn!(attempts, "harness review never approved; forwarding last draft");
    Ok(last_draft)
}
