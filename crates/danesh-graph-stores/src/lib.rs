//! danesh-graph-stores - Knowledge graph loading for danesh.
//!
//! The graph is built offline (entity extraction, co-occurrence) and loaded
//! read-only into a petgraph `UnGraph` at startup. Supported file formats:
//!
//! - **GraphML** - as written by NetworkX `write_graphml`
//! - **JSON node-link** - `{"nodes": [...], "links" | "edges": [...]}`

mod factory;
mod graph;
mod graphml;
mod node_link;

pub use factory::GraphStoreFactory;
pub use graph::{EntityGraph, EntityNode, PetgraphKnowledgeGraph, RelationEdge};
pub use graphml::parse_graphml;
pub use node_link::parse_node_link;

// Re-export core types for convenience
pub use danesh_core::traits::{GraphFormat, GraphStoreConfig, KnowledgeGraph};
