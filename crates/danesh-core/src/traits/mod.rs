//! Core traits for danesh collaborators.

mod embedder;
mod knowledge_graph;
mod llm;
mod reranker;
mod vector_index;

pub use embedder::*;
pub use knowledge_graph::*;
pub use llm::*;
pub use reranker::*;
pub use vector_index::*;
