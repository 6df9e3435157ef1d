//! Retrieval pipeline settings.

use serde::{Deserialize, Serialize};

use super::retry::RetryPolicy;
use crate::traits::EmbeddingMode;

/// Which text is embedded to search the index.
///
/// A deployment fixes one strategy; it must match how the index was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Embed a generated hypothetical answer as a document (HyDE).
    #[default]
    Hyde,
    /// Embed the raw question as a search query.
    DirectQuery,
    /// Embed the raw question as a document, for indexes keyed by
    /// pre-generated questions (QA-pair indexes).
    QuestionAsDocument,
}

impl SearchStrategy {
    /// Embedding mode used for the search text.
    pub fn embedding_mode(&self) -> EmbeddingMode {
        match self {
            SearchStrategy::Hyde | SearchStrategy::QuestionAsDocument => EmbeddingMode::Document,
            SearchStrategy::DirectQuery => EmbeddingMode::Query,
        }
    }

    pub fn expands_query(&self) -> bool {
        matches!(self, SearchStrategy::Hyde)
    }
}

/// When the re-ranking judgement runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RerankPolicy {
    /// On every query that has candidates.
    Always,
    /// Only when there are more candidates than `rerank_top_n`.
    #[default]
    AboveTopN,
    /// Never; keep the first `rerank_top_n` candidates.
    Never,
}

impl RerankPolicy {
    pub fn should_rerank(&self, candidate_count: usize, top_n: usize) -> bool {
        match self {
            RerankPolicy::Always => candidate_count > 0,
            RerankPolicy::AboveTopN => candidate_count > top_n,
            RerankPolicy::Never => false,
        }
    }
}

/// Retrieval pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub strategy: SearchStrategy,
    /// Candidates fetched from the vector index.
    pub top_k: usize,
    /// Documents kept for the final prompt.
    pub rerank_top_n: usize,
    pub rerank_policy: RerankPolicy,
    /// Breadth-first traversal depth for graph augmentation.
    pub graph_depth: usize,
    /// Sleep before every generative call after the first in a query.
    pub courtesy_delay_ms: u64,
    /// Retry policy for the re-ranking judgement.
    pub retry: RetryPolicy,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::Hyde,
            top_k: 10,
            rerank_top_n: 3,
            rerank_policy: RerankPolicy::AboveTopN,
            graph_depth: 2,
            courtesy_delay_ms: 0,
            retry: RetryPolicy::default(),
        }
    }
}

impl RetrievalConfig {
    /// Settings for a QA-pair index queried with the raw question.
    pub fn qa_pairs() -> Self {
        Self {
            strategy: SearchStrategy::QuestionAsDocument,
            ..Default::default()
        }
    }

    /// Validate configuration values are in valid ranges.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.top_k == 0 {
            return Err("top_k must be at least 1");
        }
        if self.rerank_top_n == 0 {
            return Err("rerank_top_n must be at least 1");
        }
        if self.rerank_top_n > self.top_k {
            return Err("rerank_top_n must not exceed top_k");
        }
        if self.graph_depth == 0 {
            return Err("graph_depth must be at least 1");
        }
        Ok(())
    }
}

/// Fixed user-facing texts, in the language of the indexed content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseMessages {
    /// Vector search produced no candidates.
    pub not_found: String,
    /// Candidates existed but none survived selection.
    pub nothing_selected: String,
    /// Final generation failed.
    pub generation_failed: String,
    /// The question was empty or whitespace.
    pub empty_question: String,
    /// Graph section when no knowledge graph is configured.
    pub graph_disabled: String,
    /// Graph section when no entity matched the selected documents.
    pub graph_no_matches: String,
}

impl Default for ResponseMessages {
    fn default() -> Self {
        Self {
            not_found: "متاسفانه اطلاعات مرتبطی برای پاسخ به سوال شما در منابع موجود یافت نشد."
                .to_string(),
            nothing_selected: "پس از بررسی، اطلاعات دقیقی برای پاسخ به سوال شما یافت نشد."
                .to_string(),
            generation_failed: "خطایی در هنگام تولید پاسخ رخ داد. لطفاً دوباره تلاش کنید."
                .to_string(),
            empty_question: "لطفاً سوال خود را وارد کنید.".to_string(),
            graph_disabled: "Knowledge graph context is not available.".to_string(),
            graph_no_matches: "No related entities found in the knowledge graph.".to_string(),
        }
    }
}

impl ResponseMessages {
    /// Reject blank texts; every fallback must say something to the user.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("not_found", &self.not_found),
            ("nothing_selected", &self.nothing_selected),
            ("generation_failed", &self.generation_failed),
            ("empty_question", &self.empty_question),
            ("graph_disabled", &self.graph_disabled),
            ("graph_no_matches", &self.graph_no_matches),
        ];
        match fields.iter().find(|(_, text)| text.trim().is_empty()) {
            Some((name, _)) => Err(format!("messages.{} must not be empty", name)),
            None => Ok(()),
        }
    }
}
