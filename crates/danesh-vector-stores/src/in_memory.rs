//! In-memory vector index backed by a JSON snapshot file.
//!
//! Useful for small collections, offline evaluation and tests. The snapshot
//! layout is:
//!
//! ```json
//! {"collection": "ikiu_regulations", "dimension": 768,
//!  "records": [{"id": "...", "embedding": [...], "document": "...", "metadata": {...}}]}
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use danesh_core::error::{DaneshError, DaneshResult};
use danesh_core::traits::VectorIndex;
use danesh_core::types::VectorHit;

/// One stored chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    collection: String,
    dimension: usize,
    #[serde(default)]
    records: Vec<IndexRecord>,
}

/// Brute-force cosine similarity index held in memory.
pub struct InMemoryIndex {
    collection_name: String,
    dimension: usize,
    records: RwLock<Vec<IndexRecord>>,
}

impl InMemoryIndex {
    pub fn new(collection_name: impl Into<String>, dimension: usize) -> Self {
        Self {
            collection_name: collection_name.into(),
            dimension,
            records: RwLock::new(Vec::new()),
        }
    }

    /// Load a snapshot written by [`InMemoryIndex::save`] or the ingestion pipeline.
    pub fn load(path: impl AsRef<Path>) -> DaneshResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DaneshError::index_unavailable(format!(
                "Cannot read index snapshot {}: {}",
                path.display(),
                e
            ))
        })?;
        let snapshot: Snapshot = serde_json::from_str(&content).map_err(|e| {
            DaneshError::vector_store(format!("Invalid index snapshot {}: {}", path.display(), e))
        })?;

        let index = Self::new(snapshot.collection, snapshot.dimension);
        index.insert(snapshot.records)?;
        tracing::info!(
            "Loaded {} records into in-memory collection '{}'",
            index.len(),
            index.collection_name
        );
        Ok(index)
    }

    /// Write the current contents as a snapshot.
    pub fn save(&self, path: impl AsRef<Path>) -> DaneshResult<()> {
        let records = self.read()?.clone();
        let snapshot = Snapshot {
            collection: self.collection_name.clone(),
            dimension: self.dimension,
            records,
        };
        std::fs::write(path, serde_json::to_string(&snapshot)?)?;
        Ok(())
    }

    /// Add records, replacing any with the same id.
    pub fn insert(&self, records: Vec<IndexRecord>) -> DaneshResult<()> {
        for record in &records {
            if record.embedding.len() != self.dimension {
                return Err(DaneshError::dimension_mismatch(
                    self.dimension,
                    record.embedding.len(),
                ));
            }
        }

        let mut stored = self
            .records
            .write()
            .map_err(|e| DaneshError::vector_store(format!("Failed to acquire lock: {}", e)))?;
        for record in records {
            match stored.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record,
                None => stored.push(record),
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> DaneshResult<std::sync::RwLockReadGuard<'_, Vec<IndexRecord>>> {
        self.records
            .read()
            .map_err(|e| DaneshError::vector_store(format!("Failed to acquire lock: {}", e)))
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn search(&self, query_vector: &[f32], k: usize) -> DaneshResult<Vec<VectorHit>> {
        if query_vector.len() != self.dimension {
            return Err(DaneshError::dimension_mismatch(
                self.dimension,
                query_vector.len(),
            ));
        }

        let records = self.read()?;
        let mut scored: Vec<(f32, &IndexRecord)> = records
            .iter()
            .map(|r| (cosine_similarity(query_vector, &r.embedding), r))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(score, r)| VectorHit {
                id: r.id.clone(),
                score,
                document: r.document.clone(),
                metadata: r.metadata.clone(),
            })
            .collect())
    }

    async fn count(&self) -> DaneshResult<usize> {
        Ok(self.read()?.len())
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dimension)
    }

    fn collection_name(&self) -> &str {
        &self.collection_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use danesh_core::error::ErrorCode;

    fn record(id: &str, embedding: Vec<f32>, text: &str) -> IndexRecord {
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), Value::String(format!("{}.pdf", id)));
        IndexRecord {
            id: id.to_string(),
            embedding,
            document: Some(text.to_string()),
            metadata,
        }
    }

    fn index() -> InMemoryIndex {
        let index = InMemoryIndex::new("test", 3);
        index
            .insert(vec![
                record("x", vec![1.0, 0.0, 0.0], "first"),
                record("y", vec![0.0, 1.0, 0.0], "second"),
                record("xy", vec![1.0, 1.0, 0.0], "between"),
            ])
            .unwrap();
        index
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let hits = index().search(&[1.0, 0.1, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "x");
        assert_eq!(hits[1].id, "xy");
        assert!(hits[0].score >= hits[1].score);
        assert_eq!(hits[0].document.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_search_rejects_wrong_dimension() {
        let err = index().search(&[1.0, 0.0], 2).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValDimensionMismatch);
    }

    #[tokio::test]
    async fn test_empty_index_returns_no_hits() {
        let index = InMemoryIndex::new("empty", 3);
        assert!(index.search(&[1.0, 0.0, 0.0], 5).await.unwrap().is_empty());
        assert_eq!(index.count().await.unwrap(), 0);
    }

    #[test]
    fn test_insert_replaces_same_id() {
        let index = index();
        index
            .insert(vec![record("x", vec![0.0, 0.0, 1.0], "replaced")])
            .unwrap();
        assert_eq!(index.len(), 3);
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        index().save(&path).unwrap();

        let loaded = InMemoryIndex::load(&path).unwrap();
        assert_eq!(loaded.collection_name(), "test");
        assert_eq!(loaded.dimension(), Some(3));
        assert_eq!(loaded.count().await.unwrap(), 3);
    }

    #[test]
    fn test_missing_snapshot_is_unavailable() {
        let err = InMemoryIndex::load("/nonexistent/index.json").err().unwrap();
        assert_eq!(err.code(), ErrorCode::VecIndexUnavailable);
    }
}
