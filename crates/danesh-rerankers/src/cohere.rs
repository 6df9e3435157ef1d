//! Cohere reranker implementation.

use async_trait::async_trait;
use std::time::Duration;

use danesh_core::error::{DaneshError, DaneshResult};
use danesh_core::retrieval::select_by_indices;
use danesh_core::traits::{Reranker, RerankerConfig};
use danesh_core::types::RetrievedDocument;

use reqwest::Client;
use serde::{Deserialize, Serialize};

const COHERE_RERANK_URL: &str = "https://api.cohere.ai/v1/rerank";
const DEFAULT_MODEL: &str = "rerank-multilingual-v3.0";

/// Cohere Rerank API client.
pub struct CohereReranker {
    client: Client,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct CohereRerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: Vec<&'a str>,
    top_n: usize,
    return_documents: bool,
}

#[derive(Debug, Deserialize)]
struct CohereRerankResponse {
    results: Vec<CohereRerankResult>,
}

#[derive(Debug, Deserialize)]
struct CohereRerankResult {
    index: usize,
    relevance_score: f32,
}

impl CohereReranker {
    /// Create a new Cohere reranker.
    pub fn new(config: RerankerConfig) -> DaneshResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("COHERE_API_KEY").ok())
            .ok_or_else(|| DaneshError::missing_credentials("Cohere", "COHERE_API_KEY"))?;

        let model = if config.model.is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            config.model
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                DaneshError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_key,
            model,
        })
    }
}

/// Map ranked results back onto the candidates, best first.
fn apply_results(
    candidates: &[RetrievedDocument],
    mut results: Vec<CohereRerankResult>,
    top_n: usize,
) -> Vec<RetrievedDocument> {
    results.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    let indices: Vec<usize> = results.iter().map(|r| r.index).collect();
    select_by_indices(candidates, &indices, top_n)
}

#[async_trait]
impl Reranker for CohereReranker {
    async fn rerank(
        &self,
        question: &str,
        candidates: &[RetrievedDocument],
        top_n: usize,
    ) -> DaneshResult<Vec<RetrievedDocument>> {
        if candidates.is_empty() || top_n == 0 {
            return Ok(vec![]);
        }

        let request = CohereRerankRequest {
            model: &self.model,
            query: question,
            documents: candidates.iter().map(|d| d.text.as_str()).collect(),
            top_n,
            return_documents: false,
        };

        let response = self
            .client
            .post(COHERE_RERANK_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| DaneshError::reranker(format!("Failed to call Cohere API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            if status.as_u16() == 429 {
                return Err(DaneshError::rate_limit(format!("Cohere: {}", error)));
            }
            return Err(DaneshError::reranker(format!(
                "Cohere API error ({}): {}",
                status, error
            )));
        }

        let result: CohereRerankResponse = response
            .json()
            .await
            .map_err(|e| DaneshError::reranker(format!("Failed to parse response: {}", e)))?;

        Ok(apply_results(candidates, result.results, top_n))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_results_orders_by_relevance() {
        let candidates: Vec<_> = (0..4)
            .map(|i| RetrievedDocument::new(i.to_string(), format!("t{}", i), "s"))
            .collect();
        let results: CohereRerankResponse = serde_json::from_str(
            r#"{"results": [
                {"index": 1, "relevance_score": 0.2},
                {"index": 3, "relevance_score": 0.9},
                {"index": 9, "relevance_score": 0.5}
            ]}"#,
        )
        .unwrap();

        let selected = apply_results(&candidates, results.results, 3);
        let ids: Vec<_> = selected.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1"]);
    }
}
