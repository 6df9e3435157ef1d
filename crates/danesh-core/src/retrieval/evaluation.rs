//! Offline retrieval accuracy over a labelled question set.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::orchestrator::RetrievalOrchestrator;
use crate::error::{DaneshError, DaneshResult};

/// One labelled question.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationItem {
    #[serde(default)]
    pub question: Option<String>,
    /// Chunk text the question was generated from.
    #[serde(default)]
    pub source_chunk: Option<String>,
    #[serde(default)]
    pub ground_truth_answer: Option<String>,
}

/// Outcome for a single question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationDetail {
    pub question: String,
    pub is_hit: bool,
    pub retrieved_sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_answer: Option<String>,
    pub ground_truth_answer: Option<String>,
}

/// Aggregated evaluation results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// All dataset items, including skipped ones.
    pub total_questions: usize,
    pub retrieval_hits: usize,
    /// Percentage with two decimals, e.g. `"66.67%"`.
    pub retrieval_accuracy: String,
    pub details: Vec<EvaluationDetail>,
}

impl EvaluationReport {
    pub fn accuracy(&self) -> f64 {
        if self.total_questions == 0 {
            0.0
        } else {
            self.retrieval_hits as f64 / self.total_questions as f64 * 100.0
        }
    }
}

/// Load a dataset file (a JSON array of items).
pub fn load_dataset(path: impl AsRef<Path>) -> DaneshResult<Vec<EvaluationItem>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        DaneshError::not_found(format!("evaluation dataset {}: {}", path.display(), e))
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// Measures how often the raw question retrieves its source chunk.
pub struct RetrievalEvaluator<'a> {
    orchestrator: &'a RetrievalOrchestrator,
    generate_answers: bool,
}

impl<'a> RetrievalEvaluator<'a> {
    pub fn new(orchestrator: &'a RetrievalOrchestrator) -> Self {
        Self {
            orchestrator,
            generate_answers: true,
        }
    }

    /// Skip full answer generation and only measure retrieval.
    pub fn retrieval_only(mut self) -> Self {
        self.generate_answers = false;
        self
    }

    pub async fn evaluate(&self, items: &[EvaluationItem]) -> EvaluationReport {
        let total = items.len();
        tracing::info!("Starting evaluation for {} questions", total);

        let mut hits = 0;
        let mut details = Vec::with_capacity(total);

        for (i, item) in items.iter().enumerate() {
            let (question, chunk) = match (&item.question, &item.source_chunk) {
                (Some(q), Some(c)) if !q.trim().is_empty() && !c.is_empty() => (q, c),
                _ => {
                    tracing::warn!("Skipping item {}: missing question or source_chunk", i + 1);
                    continue;
                }
            };
            tracing::info!("Processing question {}/{}: '{}'", i + 1, total, question);

            let retrieved = self.orchestrator.retrieve_candidates(question).await;
            let is_hit = retrieved.iter().any(|doc| doc.text.contains(chunk.as_str()));
            if is_hit {
                hits += 1;
            }
            tracing::debug!("Question {} hit: {}", i + 1, is_hit);

            let generated_answer = if self.generate_answers {
                Some(self.orchestrator.answer_question(question).await)
            } else {
                None
            };

            details.push(EvaluationDetail {
                question: question.clone(),
                is_hit,
                retrieved_sources: retrieved.into_iter().map(|doc| doc.source).collect(),
                generated_answer,
                ground_truth_answer: item.ground_truth_answer.clone(),
            });
        }

        let mut report = EvaluationReport {
            total_questions: total,
            retrieval_hits: hits,
            retrieval_accuracy: String::new(),
            details,
        };
        report.retrieval_accuracy = format!("{:.2}%", report.accuracy());
        tracing::info!("Retrieval accuracy: {}", report.retrieval_accuracy);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_without_questions_is_zero() {
        let report = EvaluationReport {
            total_questions: 0,
            retrieval_hits: 0,
            retrieval_accuracy: String::new(),
            details: Vec::new(),
        };
        assert_eq!(report.accuracy(), 0.0);
    }

    #[test]
    fn test_dataset_items_tolerate_missing_fields() {
        let items: Vec<EvaluationItem> =
            serde_json::from_str(r#"[{"question": "q"}, {"source_chunk": "c"}]"#).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].source_chunk.is_none());
        assert!(items[1].question.is_none());
    }

    #[test]
    fn test_missing_dataset_file() {
        assert!(load_dataset("/nonexistent/evaluation_dataset.json").is_err());
    }
}
