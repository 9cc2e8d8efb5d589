// src/graph/grounding.rs

//! Per-plan grounding context recovered from the knowledge graph.
//!
//! For each plan node we traverse outgoing relationships to a bounded
//! depth and bucket everything reachable by entity type. The bucketed
//! structure is what the reasoner sees when finalizing task text.

use serde::{Deserialize, Serialize};

use crate::graph::knowledge::KnowledgeGraph;
use crate::graph::model::NodeType;

/// Everything reachable from one plan node, formatted for the reasoner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanGrounding {
    pub plan: String,
    pub signals: Vec<String>,
    pub fsm_states: Vec<String>,
    pub examples: Vec<String>,
}

/// Assemble groundings for every plan entity, in insertion order.
pub fn assemble_groundings(kg: &KnowledgeGraph, depth: usize) -> Vec<PlanGrounding> {
    kg.list_entities(NodeType::Plan)
        .iter()
        .map(|plan| grounding_for_plan(kg, &plan.name, depth))
        .collect()
}

/// Bucket all nodes reachable from `plan_name` within `depth` hops.
///
/// Targets that no longer resolve to a node (or the empty synthetic root
/// target) are skipped. Deduplication is by formatted `name: description`
/// text, not by node identity; the BFS itself does not deduplicate.
pub fn grounding_for_plan(kg: &KnowledgeGraph, plan_name: &str, depth: usize) -> PlanGrounding {
    let mut grounding = PlanGrounding::default();

    for level in kg.bfs_relationship(plan_name, depth) {
        for record in level {
            if record.target.is_empty() || !kg.contains(&record.target) {
                continue;
            }

            let description = kg.description(&record.target).unwrap_or_default();
            let formatted = format!("{}: {}", record.target, description);

            match kg.node_type(&record.target) {
                Some(NodeType::Plan) => grounding.plan = formatted,
                Some(NodeType::Signal) => {
                    if !grounding.signals.contains(&formatted) {
                        grounding.signals.push(formatted);
                    }
                }
                Some(NodeType::FsmState) => {
                    if !grounding.fsm_states.contains(&formatted) {
                        grounding.fsm_states.push(formatted);
                    }
                }
                Some(NodeType::Example) => {
                    if !grounding.examples.contains(&formatted) {
                        grounding.examples.push(formatted);
                    }
                }
                None => {}
            }
        }
    }

    grounding
}
