//! danesh-vector-stores - Vector index implementations for danesh.
//!
//! Retrieval only reads from the index; building it is the job of the
//! ingestion pipeline.
//!
//! # Supported Backends
//!
//! - **Chroma** (feature: `chroma`, default) - Chroma REST API
//! - **In-memory** (always available) - JSON snapshot, brute-force cosine
//! - **sqlite-vec** (feature: `sqlite-vec`) - embedded SQLite with vec0 tables

#[cfg(feature = "chroma")]
mod chroma;
mod factory;
mod in_memory;
#[cfg(feature = "sqlite-vec")]
mod sqlite_vec;

#[cfg(feature = "chroma")]
pub use chroma::ChromaIndex;
pub use factory::VectorIndexFactory;
pub use in_memory::{InMemoryIndex, IndexRecord};
#[cfg(feature = "sqlite-vec")]
pub use sqlite_vec::SqliteVecIndex;

// Re-export core types for convenience
pub use danesh_core::traits::{VectorIndex, VectorStoreConfig, VectorStoreProvider};
pub use danesh_core::types::VectorHit;
