//! LLM-based reranker implementation.

use std::sync::Arc;

use async_trait::async_trait;

use danesh_core::error::{DaneshError, DaneshResult};
use danesh_core::retrieval::{
    parse_rerank_indices, rerank_prompt, retry_with_backoff, select_by_indices, RetryPolicy,
};
use danesh_core::traits::{Llm, Reranker};
use danesh_core::types::RetrievedDocument;

/// LLM-based reranker.
///
/// Shows the candidates to the model as a numbered list and asks for the
/// numbers of the most relevant ones. The reply is read as a list of
/// 1-based indices; a reply without any usable index is an error so the
/// orchestrator can fall back to similarity order.
pub struct LlmReranker {
    llm: Arc<dyn Llm>,
    retry: RetryPolicy,
}

impl LlmReranker {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self {
            llm,
            retry: RetryPolicy::default(),
        }
    }

    /// Retry policy for the judgement call.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl Reranker for LlmReranker {
    async fn rerank(
        &self,
        question: &str,
        candidates: &[RetrievedDocument],
        top_n: usize,
    ) -> DaneshResult<Vec<RetrievedDocument>> {
        if candidates.is_empty() || top_n == 0 {
            return Ok(vec![]);
        }

        let prompt = rerank_prompt(question, candidates, top_n);
        let judgement = retry_with_backoff(&self.retry, "rerank judgement", || {
            self.llm.complete(&prompt)
        })
        .await?;

        let indices = parse_rerank_indices(&judgement, candidates.len());
        tracing::debug!(
            "Rerank judgement {:?} -> indices {:?}",
            judgement.trim(),
            indices
        );
        if indices.is_empty() {
            return Err(DaneshError::rerank_parse(format!(
                "no document numbers in judgement: {:?}",
                judgement.trim()
            )));
        }

        Ok(select_by_indices(candidates, &indices, top_n))
    }

    fn model_name(&self) -> &str {
        self.llm.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use danesh_core::error::ErrorCode;
    use danesh_core::traits::{GenerationOptions, LlmResponse};
    use danesh_core::types::Message;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct ReplyLlm {
        replies: Mutex<Vec<DaneshResult<String>>>,
        calls: AtomicUsize,
        last_prompt: Mutex<String>,
    }

    impl ReplyLlm {
        fn new(replies: Vec<DaneshResult<String>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(String::new()),
            }
        }
    }

    #[async_trait]
    impl Llm for ReplyLlm {
        async fn generate(
            &self,
            messages: &[Message],
            _options: Option<GenerationOptions>,
        ) -> DaneshResult<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = messages[0].content.clone();
            let content = self.replies.lock().unwrap().remove(0)?;
            Ok(LlmResponse {
                content: Some(content),
                ..Default::default()
            })
        }

        fn model_name(&self) -> &str {
            "judge"
        }
    }

    fn candidates(n: usize) -> Vec<RetrievedDocument> {
        (0..n)
            .map(|i| RetrievedDocument::new(format!("{}", i), format!("متن {}", i), "a.pdf"))
            .collect()
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_retries: 2,
            initial_delay_ms: 1,
            max_delay_ms: 2,
            multiplier: 1.0,
        }
    }

    #[tokio::test]
    async fn test_selects_in_judged_order() {
        let llm = Arc::new(ReplyLlm::new(vec![Ok("3, 1, 1, 9".to_string())]));
        let reranker = LlmReranker::new(llm.clone());

        let selected = reranker.rerank("سوال", &candidates(10), 3).await.unwrap();
        let ids: Vec<_> = selected.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "0", "8"]);

        let prompt = llm.last_prompt.lock().unwrap().clone();
        assert!(prompt.contains("top 3"));
        assert!(prompt.contains("Document 10:"));
    }

    #[tokio::test]
    async fn test_unusable_judgement_is_error() {
        let llm = Arc::new(ReplyLlm::new(vec![Ok(
            "I cannot determine relevance".to_string()
        )]));
        let err = LlmReranker::new(llm)
            .rerank("q", &candidates(5), 3)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::RrkParseFailed);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let llm = Arc::new(ReplyLlm::new(vec![
            Err(DaneshError::rate_limit("slow down")),
            Ok("2".to_string()),
        ]));
        let reranker = LlmReranker::new(llm.clone()).with_retry(fast_retry());

        let selected = reranker.rerank("q", &candidates(4), 3).await.unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "1");
        assert_eq!(llm.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_no_candidates_skips_call() {
        let llm = Arc::new(ReplyLlm::new(vec![]));
        let selected = LlmReranker::new(llm.clone())
            .rerank("q", &[], 3)
            .await
            .unwrap();
        assert!(selected.is_empty());
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }
}
