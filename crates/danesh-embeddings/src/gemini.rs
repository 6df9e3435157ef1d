//! Gemini embedding provider (`embedContent` REST endpoint).
//!
//! Gemini embeds stored content and search terms differently, selected by
//! the request's task type. [`EmbeddingMode::Document`] maps to
//! `RETRIEVAL_DOCUMENT` and [`EmbeddingMode::Query`] to `RETRIEVAL_QUERY`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use danesh_core::error::{DaneshError, DaneshResult};
use danesh_core::traits::{Embedder, EmbedderConfig, EmbeddingMode};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini embedding provider.
pub struct GeminiEmbedder {
    client: Client,
    config: EmbedderConfig,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest {
    model: String,
    content: Content,
    task_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dimensionality: Option<usize>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedContentRequest>,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

fn task_type(mode: EmbeddingMode) -> &'static str {
    match mode {
        EmbeddingMode::Document => "RETRIEVAL_DOCUMENT",
        EmbeddingMode::Query => "RETRIEVAL_QUERY",
    }
}

impl GeminiEmbedder {
    /// Create a new Gemini embedder.
    pub fn new(config: EmbedderConfig) -> DaneshResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .ok_or_else(|| DaneshError::missing_credentials("Gemini", "GOOGLE_API_KEY"))?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            api_key
                .parse()
                .map_err(|_| DaneshError::Configuration("Invalid API key format".to_string()))?,
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
            .unwrap_or_else(|| GEMINI_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    /// Model name in `models/<id>` form, as the API expects in bodies.
    fn qualified_model(&self) -> String {
        if self.config.model.starts_with("models/") {
            self.config.model.clone()
        } else {
            format!("models/{}", self.config.model)
        }
    }

    fn request(&self, text: &str, mode: EmbeddingMode) -> EmbedContentRequest {
        EmbedContentRequest {
            model: self.qualified_model(),
            content: Content {
                parts: vec![Part {
                    text: text.to_string(),
                }],
            },
            task_type: task_type(mode),
            output_dimensionality: Some(self.config.embedding_dims),
        }
    }

    async fn post<B: Serialize>(&self, method: &str, body: &B) -> DaneshResult<String> {
        let url = format!("{}/{}:{}", self.base_url, self.qualified_model(), method);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| DaneshError::embedding(format!("Gemini embedding request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DaneshError::embedding(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| body.clone());
            if status.as_u16() == 429 {
                return Err(DaneshError::rate_limit(format!("Gemini: {}", message)));
            }
            return Err(DaneshError::embedding(format!(
                "Gemini embedding error ({}): {}",
                status, message
            )));
        }
        Ok(body)
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed(&self, text: &str, mode: EmbeddingMode) -> DaneshResult<Vec<f32>> {
        tracing::debug!("Embedding {} chars as {}", text.len(), task_type(mode));
        let body = self.post("embedContent", &self.request(text, mode)).await?;
        let response: EmbedContentResponse = serde_json::from_str(&body)
            .map_err(|e| DaneshError::embedding(format!("Failed to parse embedding: {}", e)))?;
        Ok(response.embedding.values)
    }

    async fn embed_batch(
        &self,
        texts: &[String],
        mode: EmbeddingMode,
    ) -> DaneshResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let request = BatchEmbedRequest {
            requests: texts.iter().map(|t| self.request(t, mode)).collect(),
        };
        let body = self.post("batchEmbedContents", &request).await?;
        let response: BatchEmbedResponse = serde_json::from_str(&body)
            .map_err(|e| DaneshError::embedding(format!("Failed to parse embeddings: {}", e)))?;
        if response.embeddings.len() != texts.len() {
            return Err(DaneshError::embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                response.embeddings.len()
            )));
        }
        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }

    fn dimension(&self) -> usize {
        self.config.embedding_dims
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedder(model: &str) -> GeminiEmbedder {
        GeminiEmbedder::new(EmbedderConfig {
            model: model.to_string(),
            api_key: Some("test-key".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_task_type_follows_mode() {
        let e = embedder("text-embedding-004");
        let doc = serde_json::to_value(e.request("متن", EmbeddingMode::Document)).unwrap();
        let query = serde_json::to_value(e.request("متن", EmbeddingMode::Query)).unwrap();
        assert_eq!(doc["taskType"], "RETRIEVAL_DOCUMENT");
        assert_eq!(query["taskType"], "RETRIEVAL_QUERY");
        assert_eq!(doc["model"], "models/text-embedding-004");
        assert_eq!(doc["content"]["parts"][0]["text"], "متن");
        assert_eq!(doc["outputDimensionality"], 768);
    }

    #[test]
    fn test_qualified_model_is_not_doubled() {
        assert_eq!(
            embedder("models/text-embedding-004").qualified_model(),
            "models/text-embedding-004"
        );
    }

    #[test]
    fn test_parse_embedding_response() {
        let response: EmbedContentResponse =
            serde_json::from_str(r#"{"embedding": {"values": [0.1, -0.2, 0.3]}}"#).unwrap();
        assert_eq!(response.embedding.values.len(), 3);
    }
}
