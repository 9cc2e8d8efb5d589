use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use rtlgen::errors::{Result, RtlgenError};
use rtlgen::graph::PlanGrounding;
use rtlgen::reason::{
    DebugAction, DiagnoseRequest, DraftRequest, EntitySet, HarnessRequest, HarnessVerdict,
    Operator, PlanStep, Reasoner, RelationshipSet, ReviewRequest, ReviewVerdict,
};

/// A reasoner that replays scripted replies and records every request.
///
/// Each judgment kind has its own reply queue; when a queue runs dry the
/// scripted default for that kind is returned instead, so budget tests
/// can run hundreds of rounds without scripting each one.
#[derive(Default)]
pub struct ScriptedReasoner {
    plan: Mutex<Option<Vec<PlanStep>>>,
    entities: Mutex<Option<EntitySet>>,
    relationships: Mutex<Option<RelationshipSet>>,
    tasks: Mutex<Option<Vec<String>>>,

    drafts: Mutex<VecDeque<String>>,
    default_draft: Mutex<Option<String>>,
    reviews: Mutex<VecDeque<ReviewVerdict>>,
    default_review: Mutex<Option<ReviewVerdict>>,
    harness_drafts: Mutex<VecDeque<String>>,
    harness_reviews: Mutex<VecDeque<ReviewVerdict>>,
    actions: Mutex<VecDeque<DebugAction>>,
    default_action: Mutex<Option<DebugAction>>,

    /// Every draft request seen, for feedback assertions.
    pub draft_requests: Mutex<Vec<DraftRequest>>,
    /// Every diagnosis request seen, including the trace attachments.
    pub diagnose_requests: Mutex<Vec<DiagnoseRequest>>,
    /// Every harness request seen.
    pub harness_requests: Mutex<Vec<HarnessRequest>>,
}

impl ScriptedReasoner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plan(self, plan: Vec<PlanStep>) -> Self {
        *self.plan.lock().unwrap() = Some(plan);
        self
    }

    pub fn with_entities(self, entities: EntitySet) -> Self {
        *self.entities.lock().unwrap() = Some(entities);
        self
    }

    pub fn with_relationships(self, relationships: RelationshipSet) -> Self {
        *self.relationships.lock().unwrap() = Some(relationships);
        self
    }

    pub fn with_tasks(self, tasks: Vec<String>) -> Self {
        *self.tasks.lock().unwrap() = Some(tasks);
        self
    }

    pub fn push_draft(self, draft: &str) -> Self {
        self.drafts.lock().unwrap().push_back(draft.to_string());
        self
    }

    /// Reply for every draft request once the queue is empty.
    pub fn with_default_draft(self, draft: &str) -> Self {
        *self.default_draft.lock().unwrap() = Some(draft.to_string());
        self
    }

    pub fn push_review(self, verdict: ReviewVerdict) -> Self {
        self.reviews.lock().unwrap().push_back(verdict);
        self
    }

    pub fn with_default_review(self, verdict: ReviewVerdict) -> Self {
        *self.default_review.lock().unwrap() = Some(verdict);
        self
    }

    pub fn push_harness_draft(self, harness: &str) -> Self {
        self.harness_drafts
            .lock()
            .unwrap()
            .push_back(harness.to_string());
        self
    }

    pub fn push_harness_review(self, verdict: ReviewVerdict) -> Self {
        self.harness_reviews.lock().unwrap().push_back(verdict);
        self
    }

    pub fn push_action(self, action: DebugAction) -> Self {
        self.actions.lock().unwrap().push_back(action);
        self
    }

    pub fn with_default_action(self, action: DebugAction) -> Self {
        *self.default_action.lock().unwrap() = Some(action);
        self
    }

    pub fn draft_calls(&self) -> usize {
        self.draft_requests.lock().unwrap().len()
    }

    pub fn diagnose_calls(&self) -> usize {
        self.diagnose_requests.lock().unwrap().len()
    }

    fn pop_or_default<T: Clone>(
        queue: &Mutex<VecDeque<T>>,
        default: &Mutex<Option<T>>,
        what: &str,
    ) -> Result<T> {
        if let Some(next) = queue.lock().unwrap().pop_front() {
            return Ok(next);
        }
        default.lock().unwrap().clone().ok_or_else(|| {
            RtlgenError::MalformedReply(format!("scripted reasoner ran out of {what} replies"))
        })
    }
}

#[async_trait]
impl Reasoner for ScriptedReasoner {
    async fn propose_plan(&self, _spec: &str) -> Result<Vec<PlanStep>> {
        Ok(self.plan.lock().unwrap().clone().unwrap_or_default())
    }

    async fn extract_entities(&self, _spec: &str, _plan: &[PlanStep]) -> Result<EntitySet> {
        Ok(self.entities.lock().unwrap().clone().unwrap_or_default())
    }

    async fn extract_relationships(
        &self,
        _spec: &str,
        _entities: &EntitySet,
    ) -> Result<RelationshipSet> {
        Ok(self.relationships.lock().unwrap().clone().unwrap_or_default())
    }

    async fn finalize_tasks(
        &self,
        _spec: &str,
        groundings: &[PlanGrounding],
    ) -> Result<Vec<String>> {
        match self.tasks.lock().unwrap().clone() {
            Some(tasks) => Ok(tasks),
            // Default: one task per grounded plan.
            None => Ok(groundings.iter().map(|g| g.plan.clone()).collect()),
        }
    }

    async fn draft_design(&self, request: &DraftRequest) -> Result<String> {
        self.draft_requests.lock().unwrap().push(request.clone());
        Self::pop_or_default(&self.drafts, &self.default_draft, "draft")
    }

    async fn review_design(&self, _request: &ReviewRequest) -> Result<ReviewVerdict> {
        Self::pop_or_default(&self.reviews, &self.default_review, "review")
    }

    async fn draft_harness(&self, request: &HarnessRequest) -> Result<String> {
        self.harness_requests.lock().unwrap().push(request.clone());
        Self::pop_or_default(&self.harness_drafts, &self.default_draft, "harness draft")
    }

    async fn review_harness(&self, _harness: &str, _spec: &str) -> Result<ReviewVerdict> {
        if let Some(next) = self.harness_reviews.lock().unwrap().pop_front() {
            return Ok(next);
        }
        Ok(ReviewVerdict::Approve)
    }

    async fn diagnose(&self, request: &DiagnoseRequest) -> Result<DebugAction> {
        self.diagnose_requests.lock().unwrap().push(request.clone());
        Self::pop_or_default(&self.actions, &self.default_action, "diagnosis")
    }
}

/// An operator that replays scripted verdicts, accepting once the queue
/// is empty.
#[derive(Default)]
pub struct ScriptedOperator {
    verdicts: Mutex<VecDeque<HarnessVerdict>>,
    pub approvals_requested: Mutex<Vec<String>>,
}

impl ScriptedOperator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_verdict(self, verdict: HarnessVerdict) -> Self {
        self.verdicts.lock().unwrap().push_back(verdict);
        self
    }

    pub fn approval_calls(&self) -> usize {
        self.approvals_requested.lock().unwrap().len()
    }
}

#[async_trait]
impl Operator for ScriptedOperator {
    async fn approve_harness(&self, harness: &str) -> Result<HarnessVerdict> {
        self.approvals_requested
            .lock()
            .unwrap()
            .push(harness.to_string());
        Ok(self
            .verdicts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(HarnessVerdict::Accept))
    }
}
