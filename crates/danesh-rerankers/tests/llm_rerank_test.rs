//! LLM reranker wired into the orchestrator over an in-memory index.

use async_trait::async_trait;
use danesh_core::traits::{GenerationOptions, LlmResponse};
use danesh_core::types::Message;
use danesh_core::{
    DaneshError, DaneshResult, Embedder, EmbeddingMode, Llm, QueryOutcome, RetrievalConfig,
    RetrievalOrchestrator, SearchStrategy,
};
use danesh_rerankers::LlmReranker;
use danesh_vector_stores::{InMemoryIndex, IndexRecord};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Llm for ScriptedLlm {
    async fn generate(
        &self,
        messages: &[Message],
        _options: Option<GenerationOptions>,
    ) -> DaneshResult<LlmResponse> {
        self.prompts
            .lock()
            .unwrap()
            .push(messages[0].content.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .map(LlmResponse::text)
            .ok_or_else(|| DaneshError::llm("no reply left"))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

struct AxisEmbedder;

#[async_trait]
impl Embedder for AxisEmbedder {
    async fn embed(&self, _text: &str, _mode: EmbeddingMode) -> DaneshResult<Vec<f32>> {
        Ok(vec![1.0, 0.0])
    }

    fn dimension(&self) -> usize {
        2
    }

    fn model_name(&self) -> &str {
        "axis"
    }
}

/// Ten chunks whose similarity to the query falls with their number.
fn index() -> Arc<InMemoryIndex> {
    let index = InMemoryIndex::new("regs", 2);
    let records = (0..10)
        .map(|i| IndexRecord {
            id: format!("chunk-{}", i),
            embedding: vec![1.0, i as f32 * 0.1],
            document: Some(format!("ماده {} آیین‌نامه", i + 1)),
            metadata: HashMap::from([(
                "source".to_string(),
                serde_json::Value::from(format!("doc{}.pdf", i)),
            )]),
        })
        .collect();
    index.insert(records).unwrap();
    Arc::new(index)
}

fn orchestrator(llm: Arc<ScriptedLlm>) -> RetrievalOrchestrator {
    RetrievalOrchestrator::builder(llm.clone(), Arc::new(AxisEmbedder), index())
        .reranker(Arc::new(LlmReranker::new(llm)))
        .config(RetrievalConfig {
            strategy: SearchStrategy::DirectQuery,
            ..Default::default()
        })
        .build()
        .unwrap()
}

#[tokio::test]
async fn judged_numbers_pick_the_prompt_documents() {
    let llm = ScriptedLlm::new(&["note: 3, 1, 1, 9", "پاسخ نهایی"]);
    let trace = orchestrator(llm.clone())
        .answer_question_traced("شرایط مرخصی تحصیلی چیست؟")
        .await;

    assert_eq!(trace.outcome, QueryOutcome::Answered);
    assert_eq!(trace.answer, "پاسخ نهایی");
    assert_eq!(trace.candidate_sources.len(), 10);
    assert_eq!(trace.candidate_sources[0], "doc0.pdf");
    assert_eq!(
        trace.selected_sources,
        vec!["doc2.pdf", "doc0.pdf", "doc8.pdf"]
    );
    assert!(trace.reranked);
    assert!(!trace.rerank_fell_back);

    let prompts = llm.prompts.lock().unwrap();
    assert!(prompts[0].contains("Document 10:"));
    let final_prompt = &prompts[1];
    assert!(final_prompt.contains("Source: doc2.pdf"));
    assert!(final_prompt.contains("Source: doc8.pdf"));
    assert!(!final_prompt.contains("Source: doc1.pdf"));
}

#[tokio::test]
async fn unusable_judgement_falls_back_to_similarity_order() {
    let llm = ScriptedLlm::new(&["I cannot determine relevance", "پاسخ"]);
    let trace = orchestrator(llm.clone())
        .answer_question_traced("سوال")
        .await;

    assert_eq!(trace.outcome, QueryOutcome::Answered);
    assert!(trace.rerank_fell_back);
    assert_eq!(
        trace.selected_sources,
        vec!["doc0.pdf", "doc1.pdf", "doc2.pdf"]
    );
    assert_eq!(llm.prompts.lock().unwrap().len(), 2);
}
