//! Reranker trait and related types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DaneshResult;
use crate::types::RetrievedDocument;

/// Core Reranker trait - all reranker providers implement this.
///
/// Implementations return at most `top_n` documents, each an unmodified
/// clone of an input candidate. Errors are absorbed by the orchestrator,
/// which then keeps the first `top_n` candidates.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Narrow `candidates` to the `top_n` most relevant to `question`.
    async fn rerank(
        &self,
        question: &str,
        candidates: &[RetrievedDocument],
        top_n: usize,
    ) -> DaneshResult<Vec<RetrievedDocument>>;

    /// Get the model name.
    fn model_name(&self) -> &str;
}

/// Reranker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankerConfig {
    /// Provider type.
    #[serde(default)]
    pub provider: RerankerProvider,
    /// Model name/identifier. Empty means "reuse the generation model".
    #[serde(default)]
    pub model: String,
    /// API key (if not using environment variable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            provider: RerankerProvider::Llm,
            model: String::new(),
            api_key: None,
        }
    }
}

/// Reranker provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RerankerProvider {
    #[default]
    Llm,
    Cohere,
}

impl RerankerProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            RerankerProvider::Llm => "llm",
            RerankerProvider::Cohere => "cohere",
        }
    }
}
