//! Factory for creating vector indexes.

use std::sync::Arc;

use danesh_core::error::{DaneshError, DaneshResult};
use danesh_core::traits::{VectorIndex, VectorStoreConfig, VectorStoreProvider};

use crate::in_memory::InMemoryIndex;

/// Factory for creating vector indexes.
pub struct VectorIndexFactory;

impl VectorIndexFactory {
    /// Open the index described by `config`.
    ///
    /// Fails when the backing store or collection does not exist, so a
    /// missing index stops startup instead of surfacing per query.
    pub async fn create(config: VectorStoreConfig) -> DaneshResult<Arc<dyn VectorIndex>> {
        match config.provider {
            #[cfg(feature = "chroma")]
            VectorStoreProvider::Chroma => {
                let index = crate::chroma::ChromaIndex::new(config).await?;
                Ok(Arc::new(index))
            }

            VectorStoreProvider::InMemory => {
                let path = config.get_str("path").ok_or_else(|| {
                    DaneshError::Configuration(
                        "in_memory vector store requires a 'path' to a snapshot".to_string(),
                    )
                })?;
                let index = InMemoryIndex::load(path)?;
                check_dimension(&config, index.dimension())?;
                Ok(Arc::new(index))
            }

            #[cfg(feature = "sqlite-vec")]
            VectorStoreProvider::SqliteVec => {
                let path = config.get_str("path").ok_or_else(|| {
                    DaneshError::Configuration(
                        "sqlite_vec vector store requires a 'path' to the database".to_string(),
                    )
                })?;
                if path != ":memory:" && !std::path::Path::new(path).exists() {
                    return Err(DaneshError::index_unavailable(format!(
                        "SQLite database {} does not exist; run ingestion first",
                        path
                    )));
                }
                let dims = config.embedding_model_dims.ok_or_else(|| {
                    DaneshError::Configuration(
                        "sqlite_vec vector store requires embedding_model_dims".to_string(),
                    )
                })?;
                let index =
                    crate::sqlite_vec::SqliteVecIndex::open(path, &config.collection_name, dims)?;
                Ok(Arc::new(index))
            }

            #[allow(unreachable_patterns)]
            provider => Err(DaneshError::UnsupportedProvider {
                provider: format!(
                    "{} (enable the corresponding feature)",
                    provider.as_str()
                ),
            }),
        }
    }
}

fn check_dimension(config: &VectorStoreConfig, actual: Option<usize>) -> DaneshResult<()> {
    match (config.embedding_model_dims, actual) {
        (Some(expected), Some(actual)) if expected != actual => {
            Err(DaneshError::dimension_mismatch(expected, actual))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory::IndexRecord;
    use danesh_core::error::ErrorCode;
    use serde_json::json;

    fn snapshot(dir: &tempfile::TempDir) -> String {
        let index = InMemoryIndex::new("regs", 2);
        index
            .insert(vec![IndexRecord {
                id: "1".to_string(),
                embedding: vec![1.0, 0.0],
                document: Some("ماده ۱".to_string()),
                metadata: Default::default(),
            }])
            .unwrap();
        let path = dir.path().join("index.json");
        index.save(&path).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn test_create_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let config = VectorStoreConfig {
            provider: VectorStoreProvider::InMemory,
            collection_name: "regs".to_string(),
            embedding_model_dims: Some(2),
            config: json!({ "path": snapshot(&dir) }),
        };
        let index = VectorIndexFactory::create(config).await.unwrap();
        assert_eq!(index.count().await.unwrap(), 1);
        assert_eq!(index.collection_name(), "regs");
    }

    #[tokio::test]
    async fn test_in_memory_dimension_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let config = VectorStoreConfig {
            provider: VectorStoreProvider::InMemory,
            collection_name: "regs".to_string(),
            embedding_model_dims: Some(768),
            config: json!({ "path": snapshot(&dir) }),
        };
        let err = VectorIndexFactory::create(config).await.err().unwrap();
        assert_eq!(err.code(), ErrorCode::ValDimensionMismatch);
    }

    #[tokio::test]
    async fn test_in_memory_requires_path() {
        let config = VectorStoreConfig {
            provider: VectorStoreProvider::InMemory,
            ..Default::default()
        };
        assert!(matches!(
            VectorIndexFactory::create(config).await,
            Err(DaneshError::Configuration(_))
        ));
    }
}
