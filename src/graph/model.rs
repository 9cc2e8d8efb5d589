// src/graph/model.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Entity kinds tracked in the knowledge graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Plan,
    Signal,
    FsmState,
    Example,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeType::Plan => "plan",
            NodeType::Signal => "signal",
            NodeType::FsmState => "fsm_state",
            NodeType::Example => "example",
        };
        f.write_str(s)
    }
}

/// Directed relationship kinds between entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Relationship {
    Implements,
    StateTransition,
    Examples,
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Relationship::Implements => "IMPLEMENTS",
            Relationship::StateTransition => "STATE_TRANSITION",
            Relationship::Examples => "EXAMPLES",
        };
        f.write_str(s)
    }
}

/// Direction filter for relationship queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    Outgoing,
    Incoming,
}

/// A named entity, as returned by `list_entities`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub name: String,
    pub description: String,
}

/// One edge in query / BFS results.
///
/// The synthetic level-0 BFS record has `source == "root"` and no
/// relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub source: String,
    pub target: String,
    pub relationship: Option<Relationship>,
}

/// Serialized graph, the checkpointed `graph.json` format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphExport {
    pub nodes: Vec<NodeExport>,
    pub edges: Vec<EdgeExport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeExport {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeExport {
    pub source: String,
    pub target: String,
    pub relationship: Relationship,
}
