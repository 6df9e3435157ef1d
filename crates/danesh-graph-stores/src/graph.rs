//! In-memory entity graph using petgraph UnGraph.
//!
//! Provides O(1) label lookups and bounded breadth-first traversal for
//! graph augmentation.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};

use danesh_core::traits::KnowledgeGraph;

/// Node data: a named entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityNode {
    /// Entity name, as it appears in document text.
    pub label: String,
    /// Entity type/category (e.g., "law", "organization").
    pub entity_type: Option<String>,
}

/// Edge data: a co-occurrence or extracted relation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationEdge {
    pub relation: Option<String>,
}

/// The in-memory graph type using petgraph.
pub type EntityGraph = UnGraph<EntityNode, RelationEdge>;

/// Read-only knowledge graph backed by petgraph.
#[derive(Debug, Default)]
pub struct PetgraphKnowledgeGraph {
    graph: EntityGraph,
    /// Label -> node index.
    index: HashMap<String, NodeIndex>,
}

impl PetgraphKnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity, returning the existing node if the label is known.
    ///
    /// A later non-empty type fills in a missing one.
    pub fn add_entity(&mut self, label: impl Into<String>, entity_type: Option<String>) -> NodeIndex {
        let label = label.into();
        if let Some(&idx) = self.index.get(&label) {
            if let Some(node) = self.graph.node_weight_mut(idx) {
                if node.entity_type.is_none() {
                    node.entity_type = entity_type;
                }
            }
            return idx;
        }
        let idx = self.graph.add_node(EntityNode {
            label: label.clone(),
            entity_type,
        });
        self.index.insert(label, idx);
        idx
    }

    /// Connect two known entities. Returns false if either label is unknown.
    pub fn add_relation(&mut self, source: &str, target: &str, relation: Option<String>) -> bool {
        match (self.index.get(source), self.index.get(target)) {
            (Some(&a), Some(&b)) => {
                self.graph.update_edge(a, b, RelationEdge { relation });
                true
            }
            _ => false,
        }
    }

    /// Entity data by label.
    pub fn entity(&self, label: &str) -> Option<&EntityNode> {
        self.index
            .get(label)
            .and_then(|&idx| self.graph.node_weight(idx))
    }
}

impl KnowledgeGraph for PetgraphKnowledgeGraph {
    fn entity_labels(&self) -> Vec<String> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].label.clone())
            .collect()
    }

    fn neighbors(&self, label: &str, depth: usize) -> Vec<String> {
        let Some(&start) = self.index.get(label) else {
            return Vec::new();
        };

        let mut visited = HashSet::from([start]);
        let mut frontier = vec![start];
        let mut found = Vec::new();

        for _ in 0..depth {
            let mut next: Vec<NodeIndex> = Vec::new();
            for &node in &frontier {
                for neighbor in self.graph.neighbors(node) {
                    if visited.insert(neighbor) {
                        next.push(neighbor);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            // Stable order within a hop: graph insertion order.
            next.sort();
            found.extend(next.iter().map(|&idx| self.graph[idx].label.clone()));
            frontier = next;
        }

        found
    }

    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
