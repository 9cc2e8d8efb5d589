// src/graph/mod.rs

//! Knowledge graph built from spec entities and relationships.
//!
//! - [`model`] holds node/edge types and the JSON export schema.
//! - [`knowledge`] is the typed graph with query and BFS operations.
//! - [`grounding`] assembles per-plan context for task elaboration.

pub mod grounding;
pub mod knowledge;
pub mod model;

pub use grounding::{assemble_groundings, grounding_for_plan, PlanGrounding};
pub use knowledge::KnowledgeGraph;
pub use model::{
    EdgeDirection, EdgeExport, EntityRecord, GraphExport, NodeExport, NodeType, Relationship,
    RelationshipRecord,
};
