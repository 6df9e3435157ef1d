//! SQLite vector index using the sqlite-vec extension.
//!
//! Chunks live in a `vec0` virtual table named after the collection:
//!
//! ```sql
//! CREATE VIRTUAL TABLE "<collection>" USING vec0(
//!     embedding float[<dims>], +id TEXT, +document TEXT, +metadata TEXT)
//! ```
//!
//! Distances are L2 and converted to scores with `1 / (1 + distance)`.

use std::collections::HashMap;
use std::sync::{Mutex, Once};

use async_trait::async_trait;
use rusqlite::Connection;
use serde_json::Value;
use zerocopy::IntoBytes;

use danesh_core::error::{DaneshError, DaneshResult, ErrorCode};
use danesh_core::traits::VectorIndex;
use danesh_core::types::VectorHit;

use crate::in_memory::IndexRecord;

static REGISTER_EXTENSION: Once = Once::new();

fn register_extension() {
    REGISTER_EXTENSION.call_once(|| {
        // SAFETY: sqlite3_auto_extension requires a function pointer cast.
        // This is the documented way to register sqlite-vec with rusqlite.
        unsafe {
            rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
                sqlite_vec::sqlite3_vec_init as *const (),
            )));
        }
    });
}

fn sqlite_error(context: &str, e: rusqlite::Error) -> DaneshError {
    DaneshError::VectorStore {
        message: format!("{}: {}", context, e),
        code: ErrorCode::VecOperationFailed,
        source: Some(Box::new(e)),
    }
}

/// sqlite-vec backed index.
pub struct SqliteVecIndex {
    /// SQLite connection (wrapped in Mutex for Send + Sync).
    conn: Mutex<Connection>,
    collection_name: String,
    dimension: usize,
}

impl SqliteVecIndex {
    /// Open (or create) the database and make sure the collection table exists.
    ///
    /// Use `":memory:"` as `db_path` for a throwaway index.
    pub fn open(db_path: &str, collection_name: &str, dimension: usize) -> DaneshResult<Self> {
        register_extension();

        let conn = Connection::open(db_path).map_err(|e| DaneshError::VectorStore {
            message: format!("Failed to open SQLite database {}: {}", db_path, e),
            code: ErrorCode::VecIndexUnavailable,
            source: Some(Box::new(e)),
        })?;

        let version: String = conn
            .query_row("SELECT vec_version()", [], |row| row.get(0))
            .map_err(|e| DaneshError::VectorStore {
                message: format!("sqlite-vec extension not loaded: {}", e),
                code: ErrorCode::VecConnectionFailed,
                source: Some(Box::new(e)),
            })?;
        tracing::debug!("sqlite-vec version: {}", version);

        let sql = format!(
            r#"CREATE VIRTUAL TABLE IF NOT EXISTS "{}" USING vec0(
                embedding float[{}],
                +id TEXT,
                +document TEXT,
                +metadata TEXT
            )"#,
            collection_name, dimension
        );
        conn.execute(&sql, [])
            .map_err(|e| sqlite_error("Failed to create vec0 table", e))?;

        Ok(Self {
            conn: Mutex::new(conn),
            collection_name: collection_name.to_string(),
            dimension,
        })
    }

    fn lock(&self) -> DaneshResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DaneshError::vector_store(format!("Failed to acquire lock: {}", e)))
    }

    /// Add records to the collection.
    pub fn insert(&self, records: &[IndexRecord]) -> DaneshResult<()> {
        let conn = self.lock()?;
        let sql = format!(
            r#"INSERT INTO "{}" (embedding, id, document, metadata) VALUES (?, ?, ?, ?)"#,
            self.collection_name
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| sqlite_error("Failed to prepare insert statement", e))?;

        for record in records {
            if record.embedding.len() != self.dimension {
                return Err(DaneshError::dimension_mismatch(
                    self.dimension,
                    record.embedding.len(),
                ));
            }
            let metadata = serde_json::to_string(&record.metadata)?;
            stmt.execute(rusqlite::params![
                record.embedding.as_bytes(),
                record.id,
                record.document,
                metadata
            ])
            .map_err(|e| sqlite_error(&format!("Failed to insert record '{}'", record.id), e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for SqliteVecIndex {
    async fn search(&self, query_vector: &[f32], k: usize) -> DaneshResult<Vec<VectorHit>> {
        if query_vector.len() != self.dimension {
            return Err(DaneshError::dimension_mismatch(
                self.dimension,
                query_vector.len(),
            ));
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let conn = self.lock()?;
        let sql = format!(
            r#"SELECT id, distance, document, metadata
               FROM "{}"
               WHERE embedding MATCH ? AND k = ?
               ORDER BY distance"#,
            self.collection_name
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| sqlite_error("Failed to prepare search statement", e))?;

        let rows = stmt
            .query_map(rusqlite::params![query_vector.as_bytes(), k as i64], |row| {
                let id: String = row.get(0)?;
                let distance: f32 = row.get(1)?;
                let document: Option<String> = row.get(2)?;
                let metadata: Option<String> = row.get(3)?;
                Ok((id, distance, document, metadata))
            })
            .map_err(|e| sqlite_error("Failed to execute search", e))?;

        let mut hits = Vec::new();
        for row in rows {
            let (id, distance, document, metadata) =
                row.map_err(|e| sqlite_error("Failed to read search result", e))?;
            let metadata: HashMap<String, Value> = metadata
                .and_then(|m| serde_json::from_str(&m).ok())
                .unwrap_or_default();
            hits.push(VectorHit {
                id,
                score: 1.0 / (1.0 + distance),
                document,
                metadata,
            });
        }

        tracing::debug!(
            "Search returned {} hits from collection '{}'",
            hits.len(),
            self.collection_name
        );
        Ok(hits)
    }

    async fn count(&self) -> DaneshResult<usize> {
        let conn = self.lock()?;
        let sql = format!(r#"SELECT COUNT(*) FROM "{}""#, self.collection_name);
        let count: i64 = conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| sqlite_error("Failed to count records", e))?;
        Ok(count as usize)
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dimension)
    }

    fn collection_name(&self) -> &str {
        &self.collection_name
    }
}
