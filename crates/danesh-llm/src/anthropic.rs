//! Anthropic (Claude) LLM provider implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use danesh_core::error::{DaneshError, DaneshResult};
use danesh_core::traits::{GenerationOptions, Llm, LlmConfig, LlmResponse, TokenUsage};
use danesh_core::types::{Message, MessageRole};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic LLM provider.
pub struct AnthropicLlm {
    client: Client,
    config: LlmConfig,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetail {
    message: String,
}

impl AnthropicLlm {
    /// Create a new Anthropic LLM provider.
    pub fn new(config: LlmConfig) -> DaneshResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .ok_or_else(|| DaneshError::missing_credentials("Anthropic", "ANTHROPIC_API_KEY"))?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "x-api-key",
            api_key
                .parse()
                .map_err(|_| DaneshError::Configuration("Invalid API key format".to_string()))?,
        );
        headers.insert(
            "anthropic-version",
            ANTHROPIC_VERSION
                .parse()
                .map_err(|_| DaneshError::Configuration("Invalid version header".to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                DaneshError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| ANTHROPIC_API_URL.to_string());

        let mut config = config;
        if config.model.is_empty() {
            config.model = "claude-3-5-sonnet-20240620".to_string();
        }

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    /// Split the system prompt out of the conversation; Anthropic takes it as a top-level field.
    fn build_request(&self, messages: &[Message], options: &GenerationOptions) -> AnthropicRequest {
        let mut system: Vec<&str> = Vec::new();
        let mut turns = Vec::with_capacity(messages.len());
        for message in messages {
            match message.role {
                MessageRole::System => system.push(&message.content),
                MessageRole::User => turns.push(AnthropicMessage {
                    role: "user",
                    content: message.content.clone(),
                }),
                MessageRole::Assistant => turns.push(AnthropicMessage {
                    role: "assistant",
                    content: message.content.clone(),
                }),
            }
        }

        AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: options.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: options.temperature.unwrap_or(self.config.temperature),
            system: (!system.is_empty()).then(|| system.join("\n\n")),
            messages: turns,
        }
    }
}

fn response_text(content: &[AnthropicContent]) -> Option<String> {
    let text: String = content
        .iter()
        .filter(|block| block.content_type == "text")
        .filter_map(|block| block.text.as_deref())
        .collect();
    (!text.is_empty()).then_some(text)
}

#[async_trait]
impl Llm for AnthropicLlm {
    async fn generate(
        &self,
        messages: &[Message],
        options: Option<GenerationOptions>,
    ) -> DaneshResult<LlmResponse> {
        let request = self.build_request(messages, &options.unwrap_or_default());
        debug!(model = %request.model, turns = request.messages.len(), "anthropic request");

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| DaneshError::llm(format!("Anthropic request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DaneshError::llm(format!("Failed to read Anthropic response: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(match status.as_u16() {
                429 => DaneshError::rate_limit(format!("Anthropic: {}", message)),
                401 | 403 => DaneshError::authentication(format!("Anthropic: {}", message)),
                code => DaneshError::llm(format!("Anthropic returned {}: {}", code, message)),
            });
        }

        let parsed: AnthropicResponse = serde_json::from_str(&body)
            .map_err(|e| DaneshError::llm(format!("Unexpected Anthropic response: {}", e)))?;

        Ok(LlmResponse {
            content: response_text(&parsed.content),
            usage: parsed.usage.map(|u| TokenUsage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
                total_tokens: u.input_tokens + u.output_tokens,
            }),
            finish_reason: parsed.stop_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
