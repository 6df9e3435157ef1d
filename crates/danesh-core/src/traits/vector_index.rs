//! Read-only vector index trait and related types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DaneshResult;
use crate::types::VectorHit;

/// Core VectorIndex trait - every nearest-neighbour backend implements this.
///
/// The index is built by the ingestion pipeline; retrieval only queries it.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return up to `k` hits ordered from most to least similar.
    ///
    /// An empty result is not an error.
    async fn search(&self, query_vector: &[f32], k: usize) -> DaneshResult<Vec<VectorHit>>;

    /// Number of stored chunks.
    async fn count(&self) -> DaneshResult<usize>;

    /// Dimensionality of stored vectors, when the backend knows it.
    fn dimension(&self) -> Option<usize>;

    /// Name of the collection being queried.
    fn collection_name(&self) -> &str;
}

/// Vector index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    /// Provider type.
    pub provider: VectorStoreProvider,
    /// Collection name.
    pub collection_name: String,
    /// Expected embedding dimensions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model_dims: Option<usize>,
    /// Provider-specific configuration.
    #[serde(flatten)]
    pub config: serde_json::Value,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            provider: VectorStoreProvider::Chroma,
            collection_name: "ikiu_regulations".to_string(),
            embedding_model_dims: Some(768),
            config: serde_json::json!({}),
        }
    }
}

impl VectorStoreConfig {
    /// Read a string option from the provider-specific section.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(|v| v.as_str())
    }
}

/// Vector index provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VectorStoreProvider {
    #[default]
    Chroma,
    InMemory,
    SqliteVec,
}

impl VectorStoreProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            VectorStoreProvider::Chroma => "chroma",
            VectorStoreProvider::InMemory => "in_memory",
            VectorStoreProvider::SqliteVec => "sqlite_vec",
        }
    }
}
