//! Factory for creating embedding providers.

use std::sync::Arc;

use danesh_core::error::DaneshResult;
use danesh_core::traits::{Embedder, EmbedderConfig, EmbedderProvider};

use crate::gemini::GeminiEmbedder;
use crate::ollama::OllamaEmbedder;
use crate::openai::OpenAIEmbedder;

/// Factory for creating embedding providers.
pub struct EmbedderFactory;

impl EmbedderFactory {
    /// Create an embedder from the given configuration.
    pub fn create(
        provider: EmbedderProvider,
        config: EmbedderConfig,
    ) -> DaneshResult<Arc<dyn Embedder>> {
        tracing::debug!(
            "Creating {} embedder '{}' ({} dims)",
            provider.as_str(),
            config.model,
            config.embedding_dims
        );
        match provider {
            EmbedderProvider::Gemini => Ok(Arc::new(GeminiEmbedder::new(config)?)),
            EmbedderProvider::OpenAI => Ok(Arc::new(OpenAIEmbedder::new(config)?)),
            EmbedderProvider::Ollama => Ok(Arc::new(OllamaEmbedder::new(config)?)),
        }
    }

    /// Create a Gemini `text-embedding-004` embedder.
    pub fn gemini() -> DaneshResult<Arc<dyn Embedder>> {
        Self::create(EmbedderProvider::Gemini, EmbedderConfig::default())
    }

    /// Create an Ollama embedder with a specific model.
    pub fn ollama_with_model(
        model: impl Into<String>,
        dims: usize,
    ) -> DaneshResult<Arc<dyn Embedder>> {
        let config = EmbedderConfig {
            model: model.into(),
            embedding_dims: dims,
            ..Default::default()
        };
        Self::create(EmbedderProvider::Ollama, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_comes_from_config() {
        let embedder = EmbedderFactory::ollama_with_model("nomic-embed-text", 768).unwrap();
        assert_eq!(embedder.dimension(), 768);
        assert_eq!(embedder.model_name(), "nomic-embed-text");
    }

    #[test]
    fn test_gemini_with_key() {
        let config = EmbedderConfig {
            api_key: Some("k".to_string()),
            ..Default::default()
        };
        let embedder = EmbedderFactory::create(EmbedderProvider::Gemini, config).unwrap();
        assert_eq!(embedder.model_name(), "models/text-embedding-004");
    }
}
