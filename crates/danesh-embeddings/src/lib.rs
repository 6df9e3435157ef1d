//! danesh-embeddings - Embedding provider implementations for danesh.
//!
//! # Supported Providers
//!
//! - **Gemini** (always available) - task-type aware `text-embedding-004`
//! - **OpenAI** (feature: `openai`) - text-embedding-3-small/large
//! - **Ollama** (feature: `ollama`) - local embedding models
//!
//! The model must be the one the vector index was built with.

mod factory;
mod gemini;
mod ollama;
mod openai;

pub use factory::EmbedderFactory;
pub use gemini::GeminiEmbedder;
pub use ollama::OllamaEmbedder;
pub use openai::OpenAIEmbedder;

// Re-export core types for convenience
pub use danesh_core::traits::{Embedder, EmbedderConfig, EmbedderProvider, EmbeddingMode};
