//! danesh-llm - LLM provider implementations for danesh.
//!
//! # Supported Providers
//!
//! - **Gemini** (always available) - Gemini 1.5 Flash/Pro over REST
//! - **Anthropic** (always available) - Claude models over REST
//! - **OpenAI** (feature: `openai`) - GPT-4o and compatible APIs
//! - **Ollama** (feature: `ollama`) - Local models via Ollama
//!
//! # Example
//!
//! ```ignore
//! use danesh_llm::LlmFactory;
//!
//! let llm = LlmFactory::gemini_with_model("gemini-1.5-flash")?;
//! let text = llm.complete("سلام").await?;
//! ```

mod anthropic;
mod factory;
mod gemini;
mod ollama;
mod openai;

pub use anthropic::AnthropicLlm;
pub use factory::LlmFactory;
pub use gemini::GeminiLlm;
pub use ollama::OllamaLlm;
pub use openai::OpenAIProvider;

// Re-export core types for convenience
pub use danesh_core::traits::{GenerationOptions, Llm, LlmConfig, LlmProvider, LlmResponse};
