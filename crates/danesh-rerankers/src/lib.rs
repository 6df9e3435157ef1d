//! danesh-rerankers - Reranker implementations for danesh.
//!
//! Rerankers narrow the similarity-ranked candidates down to the few that
//! go into the answer prompt.
//!
//! # Supported Backends
//!
//! - **LLM** (default) - asks a generative model for the most relevant document numbers
//! - **Cohere** - Cohere Rerank API

mod cohere;
mod factory;
mod llm_reranker;

pub use cohere::CohereReranker;
pub use factory::RerankerFactory;
pub use llm_reranker::LlmReranker;

// Re-export core types
pub use danesh_core::traits::{Reranker, RerankerConfig, RerankerProvider};
