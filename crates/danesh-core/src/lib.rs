//! danesh-core - Core library for danesh.
//!
//! This crate provides the collaborator traits, configuration, error types
//! and the [`RetrievalOrchestrator`] that answers questions over a corpus of
//! Persian university regulations.
//!
//! # Example
//!
//! ```ignore
//! use danesh_core::{RetrievalOrchestrator, RetrievalConfig};
//!
//! let orchestrator = RetrievalOrchestrator::builder(llm, embedder, index)
//!     .graph(graph)
//!     .reranker(reranker)
//!     .config(RetrievalConfig::default())
//!     .build()?;
//!
//! let answer = orchestrator.answer_question("شرایط مرخصی تحصیلی چیست؟").await;
//! ```

pub mod config;
pub mod error;
pub mod retrieval;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{DaneshConfig, EmbedderProviderConfig, LlmProviderConfig, PromptConfig};
pub use error::{DaneshError, DaneshResult, ErrorCode};
pub use retrieval::{
    AnswerTrace, PromptTemplate, QueryOutcome, RerankPolicy, ResponseMessages, RetrievalConfig,
    RetrievalEvaluator, RetrievalOrchestrator, RetryPolicy, SearchStrategy,
};
pub use traits::{
    Embedder, EmbedderConfig, EmbedderProvider, EmbeddingMode, KnowledgeGraph, Llm, LlmConfig,
    LlmProvider, Reranker, RerankerConfig, VectorIndex, VectorStoreConfig,
};
pub use types::{Message, MessageRole, RetrievedDocument, VectorHit};
