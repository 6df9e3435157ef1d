//! Factory for creating reranker providers.

use std::sync::Arc;

use danesh_core::error::DaneshResult;
use danesh_core::retrieval::RetryPolicy;
use danesh_core::traits::{Llm, Reranker, RerankerConfig, RerankerProvider};

use crate::cohere::CohereReranker;
use crate::llm_reranker::LlmReranker;

/// Factory for creating reranker providers.
pub struct RerankerFactory;

impl RerankerFactory {
    /// Create a reranker from the given configuration.
    ///
    /// `judge` is the model the LLM reranker asks; it is ignored by
    /// API-based providers.
    pub fn create(
        config: RerankerConfig,
        judge: Arc<dyn Llm>,
        retry: RetryPolicy,
    ) -> DaneshResult<Arc<dyn Reranker>> {
        tracing::debug!("Creating {} reranker", config.provider.as_str());
        match config.provider {
            RerankerProvider::Llm => Ok(Arc::new(LlmReranker::new(judge).with_retry(retry))),
            RerankerProvider::Cohere => Ok(Arc::new(CohereReranker::new(config)?)),
        }
    }

    /// Create a Cohere reranker.
    pub fn cohere(api_key: &str) -> DaneshResult<Arc<dyn Reranker>> {
        let config = RerankerConfig {
            provider: RerankerProvider::Cohere,
            api_key: Some(api_key.to_string()),
            ..Default::default()
        };
        Ok(Arc::new(CohereReranker::new(config)?))
    }
}
