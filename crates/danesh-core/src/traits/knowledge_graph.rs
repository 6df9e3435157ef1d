//! Knowledge graph trait and related types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Read-only entity graph consulted during graph augmentation.
///
/// The graph is loaded fully into memory at startup, so lookups are
/// synchronous and infallible.
pub trait KnowledgeGraph: Send + Sync {
    /// Labels of every entity node, in a stable order.
    fn entity_labels(&self) -> Vec<String>;

    /// Entities reachable from `label` within `depth` hops, nearest first.
    ///
    /// The start node itself is excluded and each entity appears once.
    /// Unknown or isolated labels yield an empty list.
    fn neighbors(&self, label: &str, depth: usize) -> Vec<String>;

    /// Number of entity nodes.
    fn node_count(&self) -> usize;

    /// Number of relation edges.
    fn edge_count(&self) -> usize;
}

/// On-disk format of a knowledge graph file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GraphFormat {
    /// Pick the format from the file extension.
    #[default]
    Auto,
    GraphMl,
    /// JSON node-link (`nodes` plus `links` or `edges`).
    Json,
}

/// Knowledge graph configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStoreConfig {
    /// Path to the graph file.
    pub path: PathBuf,
    /// File format.
    #[serde(default)]
    pub format: GraphFormat,
}

impl GraphStoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: GraphFormat::Auto,
        }
    }
}
