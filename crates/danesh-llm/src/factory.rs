//! Factory for creating LLM providers.

use std::sync::Arc;

use danesh_core::error::DaneshResult;
use danesh_core::traits::{Llm, LlmConfig, LlmProvider};

use crate::anthropic::AnthropicLlm;
use crate::gemini::GeminiLlm;
use crate::ollama::OllamaLlm;
use crate::openai::OpenAIProvider;

/// Factory for creating LLM providers.
pub struct LlmFactory;

impl LlmFactory {
    /// Create an LLM provider from the given configuration.
    pub fn create(provider: LlmProvider, config: LlmConfig) -> DaneshResult<Arc<dyn Llm>> {
        tracing::debug!("Creating {} LLM '{}'", provider.as_str(), config.model);
        match provider {
            LlmProvider::Gemini => Ok(Arc::new(GeminiLlm::new(config)?)),
            LlmProvider::OpenAI => Ok(Arc::new(OpenAIProvider::new(config)?)),
            LlmProvider::Anthropic => Ok(Arc::new(AnthropicLlm::new(config)?)),
            LlmProvider::Ollama => Ok(Arc::new(OllamaLlm::new(config)?)),
        }
    }

    /// Create a Gemini LLM provider with default configuration.
    pub fn gemini() -> DaneshResult<Arc<dyn Llm>> {
        Self::create(LlmProvider::Gemini, LlmConfig::default())
    }

    /// Create a Gemini LLM provider with a specific model.
    pub fn gemini_with_model(model: impl Into<String>) -> DaneshResult<Arc<dyn Llm>> {
        let config = LlmConfig {
            model: model.into(),
            ..Default::default()
        };
        Self::create(LlmProvider::Gemini, config)
    }

    /// Create an Ollama LLM provider with a specific model.
    pub fn ollama_with_model(model: impl Into<String>) -> DaneshResult<Arc<dyn Llm>> {
        let config = LlmConfig {
            model: model.into(),
            ..Default::default()
        };
        Self::create(LlmProvider::Ollama, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use danesh_core::ErrorCode;

    #[test]
    fn test_create_with_explicit_key() {
        let config = LlmConfig {
            model: "gemini-1.5-pro".to_string(),
            api_key: Some("k".to_string()),
            ..Default::default()
        };
        let llm = LlmFactory::create(LlmProvider::Gemini, config).unwrap();
        assert_eq!(llm.model_name(), "gemini-1.5-pro");
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let llm = LlmFactory::ollama_with_model("qwen2").unwrap();
        assert_eq!(llm.model_name(), "qwen2");
    }

    #[test]
    fn test_invalid_ollama_url() {
        let config = LlmConfig {
            base_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(LlmFactory::create(LlmProvider::Ollama, config).is_err());
    }

    #[test]
    fn test_missing_anthropic_key() {
        if std::env::var("ANTHROPIC_API_KEY").is_ok() {
            return;
        }
        let err = match LlmFactory::create(LlmProvider::Anthropic, LlmConfig::default()) {
            Err(e) => e,
            Ok(_) => panic!("expected missing key error"),
        };
        assert_eq!(err.code(), ErrorCode::AuthMissingCredentials);
    }
}
