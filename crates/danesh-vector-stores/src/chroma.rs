//! Chroma vector index implementation (REST API).

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use danesh_core::error::{DaneshError, DaneshResult, ErrorCode};
use danesh_core::traits::{VectorIndex, VectorStoreConfig};
use danesh_core::types::VectorHit;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

const DEFAULT_URL: &str = "http://localhost:8000";

/// Chroma collection opened for querying.
///
/// The collection is resolved once at construction; a missing collection
/// means the ingestion pipeline has not run and is reported as
/// [`ErrorCode::VecIndexUnavailable`].
pub struct ChromaIndex {
    client: Client,
    base_url: String,
    collection_id: String,
    config: VectorStoreConfig,
}

#[derive(Debug, Deserialize)]
struct ChromaCollection {
    id: String,
    #[allow(dead_code)]
    name: String,
}

impl ChromaIndex {
    /// Connect to Chroma and resolve the configured collection.
    pub async fn new(config: VectorStoreConfig) -> DaneshResult<Self> {
        let base_url = config
            .get_str("url")
            .unwrap_or(DEFAULT_URL)
            .trim_end_matches('/')
            .to_string();
        let tenant = config.get_str("tenant").unwrap_or("default_tenant").to_string();
        let database = config
            .get_str("database")
            .unwrap_or("default_database")
            .to_string();
        let timeout_secs = config
            .config
            .get("timeout_secs")
            .and_then(Value::as_u64)
            .unwrap_or(30);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| {
                DaneshError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        let url = format!(
            "{}/api/v1/tenants/{}/databases/{}/collections/{}",
            base_url, tenant, database, config.collection_name
        );
        let response = client.get(&url).send().await.map_err(connection_error)?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(DaneshError::index_unavailable(format!(
                "Chroma collection '{}' does not exist; run ingestion first",
                config.collection_name
            )));
        }
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            // Older Chroma versions answer a missing collection with a 500.
            if error.contains("does not exist") {
                return Err(DaneshError::index_unavailable(format!(
                    "Chroma collection '{}' does not exist; run ingestion first",
                    config.collection_name
                )));
            }
            return Err(DaneshError::vector_store(format!(
                "Failed to get collection ({}): {}",
                status, error
            )));
        }

        let collection: ChromaCollection = response
            .json()
            .await
            .map_err(|e| DaneshError::vector_store(format!("Failed to parse response: {}", e)))?;

        tracing::info!(
            "Opened Chroma collection '{}' ({}) at {}",
            config.collection_name,
            collection.id,
            base_url
        );

        Ok(Self {
            client,
            base_url,
            collection_id: collection.id,
            config,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/api/v1/collections/{}{}",
            self.base_url, self.collection_id, path
        )
    }
}

fn connection_error(e: reqwest::Error) -> DaneshError {
    DaneshError::VectorStore {
        message: format!("Failed to reach Chroma: {}", e),
        code: ErrorCode::VecConnectionFailed,
        source: Some(Box::new(e)),
    }
}

/// Convert a Chroma query response (one query embedding) into hits.
///
/// Scores are `1 - distance`. Missing documents are kept as `None` so the
/// caller can decide what to do with them.
pub(crate) fn hits_from_query_response(result: &Value) -> Vec<VectorHit> {
    let ids = result["ids"][0].as_array().cloned().unwrap_or_default();
    let distances = result["distances"][0].as_array().cloned().unwrap_or_default();
    let documents = result["documents"][0].as_array().cloned().unwrap_or_default();
    let metadatas = result["metadatas"][0].as_array().cloned().unwrap_or_default();

    ids.into_iter()
        .enumerate()
        .map(|(i, id)| {
            let distance = distances
                .get(i)
                .and_then(Value::as_f64)
                .unwrap_or(1.0) as f32;
            let document = documents
                .get(i)
                .and_then(Value::as_str)
                .map(str::to_string);
            let metadata: HashMap<String, Value> = metadatas
                .get(i)
                .and_then(Value::as_object)
                .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_default();

            VectorHit {
                id: id.as_str().unwrap_or_default().to_string(),
                score: 1.0 - distance,
                document,
                metadata,
            }
        })
        .collect()
}

#[async_trait]
impl VectorIndex for ChromaIndex {
    async fn search(&self, query_vector: &[f32], k: usize) -> DaneshResult<Vec<VectorHit>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let body = json!({
            "query_embeddings": [query_vector],
            "n_results": k,
            "include": ["documents", "metadatas", "distances"]
        });

        let response = self
            .client
            .post(self.api_url("/query"))
            .json(&body)
            .send()
            .await
            .map_err(connection_error)?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(DaneshError::vector_store(format!("Failed to query: {}", error)));
        }

        let result: Value = response
            .json()
            .await
            .map_err(|e| DaneshError::vector_store(format!("Failed to parse response: {}", e)))?;

        let hits = hits_from_query_response(&result);
        tracing::debug!(
            "Chroma returned {} hits from '{}'",
            hits.len(),
            self.config.collection_name
        );
        Ok(hits)
    }

    async fn count(&self) -> DaneshResult<usize> {
        let response = self
            .client
            .get(self.api_url("/count"))
            .send()
            .await
            .map_err(connection_error)?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(DaneshError::vector_store(format!("Failed to count: {}", error)));
        }

        response
            .json::<usize>()
            .await
            .map_err(|e| DaneshError::vector_store(format!("Failed to parse count: {}", e)))
    }

    fn dimension(&self) -> Option<usize> {
        self.config.embedding_model_dims
    }

    fn collection_name(&self) -> &str {
        &self.config.collection_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hits_from_query_response() {
        let response = json!({
            "ids": [["a", "b"]],
            "distances": [[0.25, 0.75]],
            "documents": [["ماده ۱", null]],
            "metadatas": [[{"source": "regs.pdf"}, null]]
        });

        let hits = hits_from_query_response(&response);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "a");
        assert!((hits[0].score - 0.75).abs() < 1e-6);
        assert_eq!(hits[0].document.as_deref(), Some("ماده ۱"));
        assert_eq!(hits[0].metadata["source"], "regs.pdf");
        assert!(hits[1].document.is_none());
        assert!(hits[1].metadata.is_empty());
    }

    #[test]
    fn test_empty_query_response() {
        let hits = hits_from_query_response(&json!({"ids": [[]]}));
        assert!(hits.is_empty());
        assert!(hits_from_query_response(&json!({})).is_empty());
    }
}
