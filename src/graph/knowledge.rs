// src/graph/knowledge.rs

//! Typed entity/relationship graph with bounded breadth-first retrieval.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tracing::warn;

use crate::errors::{Result, RtlgenError};
use crate::graph::model::{
    EdgeDirection, EdgeExport, EntityRecord, GraphExport, NodeExport, NodeType, Relationship,
    RelationshipRecord,
};

#[derive(Debug, Clone)]
struct NodeData {
    name: String,
    node_type: NodeType,
    description: String,
}

/// Directed multigraph of spec entities.
///
/// Node ids are globally unique across entity types; inserting the same id
/// again silently overwrites the earlier entity (logged at `warn`). Edges
/// may form cycles and duplicates are allowed, but both endpoints must
/// already exist: [`KnowledgeGraph::add_edge`] rejects dangling edges, so
/// a built graph never contains one.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    graph: DiGraph<NodeData, Relationship>,
    index: HashMap<String, NodeIndex>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an entity.
    pub fn insert_node(&mut self, name: &str, node_type: NodeType, description: &str) {
        let data = NodeData {
            name: name.to_string(),
            node_type,
            description: description.to_string(),
        };

        match self.index.get(name) {
            Some(&idx) => {
                let old = &self.graph[idx];
                warn!(
                    node = %name,
                    old_type = %old.node_type,
                    new_type = %node_type,
                    "node id collision; overwriting earlier entity"
                );
                self.graph[idx] = data;
            }
            None => {
                let idx = self.graph.add_node(data);
                self.index.insert(name.to_string(), idx);
            }
        }
    }

    /// Add a directed edge between two existing entities.
    pub fn add_edge(&mut self, source: &str, target: &str, relationship: Relationship) -> Result<()> {
        let missing = if !self.index.contains_key(source) {
            Some(source)
        } else if !self.index.contains_key(target) {
            Some(target)
        } else {
            None
        };

        if let Some(missing) = missing {
            return Err(RtlgenError::DanglingEdge {
                edge_source: source.to_string(),
                edge_target: target.to_string(),
                missing: missing.to_string(),
            });
        }

        let s = self.index[source];
        let t = self.index[target];
        self.graph.add_edge(s, t, relationship);
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Type of a node, if it exists.
    pub fn node_type(&self, name: &str) -> Option<NodeType> {
        self.index.get(name).map(|&idx| self.graph[idx].node_type)
    }

    /// Description of a node, if it exists.
    pub fn description(&self, name: &str) -> Option<&str> {
        self.index
            .get(name)
            .map(|&idx| self.graph[idx].description.as_str())
    }

    /// All entities of a given type, in insertion order.
    pub fn list_entities(&self, node_type: NodeType) -> Vec<EntityRecord> {
        self.graph
            .node_indices()
            .filter_map(|idx| {
                let data = &self.graph[idx];
                (data.node_type == node_type).then(|| EntityRecord {
                    name: data.name.clone(),
                    description: data.description.clone(),
                })
            })
            .collect()
    }

    /// Edges touching `name`, optionally filtered by relationship kind and
    /// direction. Unknown names yield an empty result, matching query
    /// semantics elsewhere (queries never fail, they return nothing).
    pub fn get_relationships(
        &self,
        name: &str,
        relationship: Option<Relationship>,
        direction: Option<EdgeDirection>,
    ) -> Vec<RelationshipRecord> {
        let Some(&idx) = self.index.get(name) else {
            return Vec::new();
        };

        let mut results = Vec::new();

        if direction.is_none() || direction == Some(EdgeDirection::Outgoing) {
            results.extend(self.directed_records(idx, Direction::Outgoing, relationship));
        }
        if direction.is_none() || direction == Some(EdgeDirection::Incoming) {
            results.extend(self.directed_records(idx, Direction::Incoming, relationship));
        }

        results
    }

    /// Bounded BFS over outgoing edges.
    ///
    /// Returns `depth + 1` ordered levels. Level 0 is a single synthetic
    /// record `{source: "root", target: root}`. Level k is the
    /// concatenation, over every record in level k-1, of that record's
    /// target's outgoing edges. No deduplication: a target reachable via
    /// multiple paths appears once per path. An unknown root simply yields
    /// empty levels past level 0.
    pub fn bfs_relationship(&self, root: &str, depth: usize) -> Vec<Vec<RelationshipRecord>> {
        let mut levels: Vec<Vec<RelationshipRecord>> = Vec::with_capacity(depth + 1);
        levels.push(vec![RelationshipRecord {
            source: "root".to_string(),
            target: root.to_string(),
            relationship: None,
        }]);

        let mut frontier = levels[0].clone();
        for _ in 0..depth {
            let mut next = Vec::new();
            for record in &frontier {
                next.extend(self.get_relationships(
                    &record.target,
                    None,
                    Some(EdgeDirection::Outgoing),
                ));
            }
            levels.push(next.clone());
            frontier = next;
        }

        levels
    }

    /// Serialize to the checkpointed JSON shape.
    pub fn export(&self) -> GraphExport {
        let nodes = self
            .graph
            .node_indices()
            .map(|idx| {
                let data = &self.graph[idx];
                NodeExport {
                    id: data.name.clone(),
                    node_type: data.node_type,
                    description: data.description.clone(),
                }
            })
            .collect();

        let edges = self
            .graph
            .edge_indices()
            .filter_map(|eidx| {
                let (s, t) = self.graph.edge_endpoints(eidx)?;
                Some(EdgeExport {
                    source: self.graph[s].name.clone(),
                    target: self.graph[t].name.clone(),
                    relationship: self.graph[eidx],
                })
            })
            .collect();

        GraphExport { nodes, edges }
    }

    /// Rebuild a graph from an export.
    pub fn from_export(export: &GraphExport) -> Result<Self> {
        let mut kg = Self::new();
        for node in &export.nodes {
            kg.insert_node(&node.id, node.node_type, &node.description);
        }
        for edge in &export.edges {
            kg.add_edge(&edge.source, &edge.target, edge.relationship)?;
        }
        Ok(kg)
    }

    fn directed_records(
        &self,
        idx: NodeIndex,
        dir: Direction,
        filter: Option<Relationship>,
    ) -> Vec<RelationshipRecord> {
        let mut records: Vec<RelationshipRecord> = self
            .graph
            .edges_directed(idx, dir)
            .filter(|edge| filter.is_none() || filter == Some(*edge.weight()))
            .map(|edge| RelationshipRecord {
                source: self.graph[edge.source()].name.clone(),
                target: self.graph[edge.target()].name.clone(),
                relationship: Some(*edge.weight()),
            })
            .collect();

        // petgraph iterates most-recent-first; present edges in insertion
        // order so BFS levels and query output are stable.
        records.reverse();
        records
    }
}
