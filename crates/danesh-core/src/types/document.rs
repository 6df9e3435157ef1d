//! Search hits and the documents built from them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{DaneshError, DaneshResult};

/// Metadata key holding the originating document identifier.
pub const SOURCE_KEY: &str = "source";

/// Source label used when an indexed chunk carries no `source` metadata.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// Raw nearest-neighbour hit as returned by a vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorHit {
    /// Identifier of the stored chunk.
    pub id: String,
    /// Similarity score, higher is closer.
    pub score: f32,
    /// Stored chunk text, if the backend returned it.
    #[serde(default)]
    pub document: Option<String>,
    /// Metadata payload.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// A validated search hit, scoped to one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub id: String,
    pub text: String,
    pub source: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl RetrievedDocument {
    pub fn new(id: impl Into<String>, text: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let mut metadata = HashMap::new();
        metadata.insert(
            SOURCE_KEY.to_string(),
            serde_json::Value::String(source.clone()),
        );
        Self {
            id: id.into(),
            text: text.into(),
            source,
            score: 0.0,
            metadata,
        }
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// Metadata value as a string, if present.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

impl TryFrom<VectorHit> for RetrievedDocument {
    type Error = DaneshError;

    fn try_from(hit: VectorHit) -> DaneshResult<Self> {
        let text = match hit.document {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                return Err(DaneshError::parse(format!(
                    "hit '{}' has no document text",
                    hit.id
                )))
            }
        };

        let source = hit
            .metadata
            .get(SOURCE_KEY)
            .and_then(|v| match v {
                serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
                serde_json::Value::Null => None,
                serde_json::Value::String(_) => None,
                other => Some(other.to_string()),
            })
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

        Ok(Self {
            id: hit.id,
            text,
            source,
            score: hit.score,
            metadata: hit.metadata,
        })
    }
}

/// Convert raw hits into documents, dropping and logging the malformed ones.
pub fn documents_from_hits(hits: Vec<VectorHit>) -> Vec<RetrievedDocument> {
    hits.into_iter()
        .filter_map(|hit| match RetrievedDocument::try_from(hit) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!("Dropping search hit: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hit(id: &str, document: Option<&str>, metadata: serde_json::Value) -> VectorHit {
        VectorHit {
            id: id.to_string(),
            score: 0.5,
            document: document.map(str::to_string),
            metadata: serde_json::from_value(metadata).unwrap(),
        }
    }

    #[test]
    fn test_hit_with_source_converts() {
        let doc = RetrievedDocument::try_from(hit(
            "c1",
            Some("ماده ۱"),
            json!({"source": "regulations.pdf", "page": 3}),
        ))
        .unwrap();
        assert_eq!(doc.source, "regulations.pdf");
        assert_eq!(doc.text, "ماده ۱");
        assert_eq!(doc.metadata["page"], json!(3));
    }

    #[test]
    fn test_missing_source_defaults_to_unknown() {
        let doc = RetrievedDocument::try_from(hit("c1", Some("text"), json!({}))).unwrap();
        assert_eq!(doc.source, UNKNOWN_SOURCE);
    }

    #[test]
    fn test_blank_text_is_rejected() {
        assert!(RetrievedDocument::try_from(hit("c1", Some("  "), json!({}))).is_err());
        assert!(RetrievedDocument::try_from(hit("c2", None, json!({}))).is_err());
    }

    #[test]
    fn test_documents_from_hits_keeps_order_and_drops_invalid() {
        let docs = documents_from_hits(vec![
            hit("a", Some("first"), json!({})),
            hit("b", None, json!({})),
            hit("c", Some("third"), json!({})),
        ]);
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
