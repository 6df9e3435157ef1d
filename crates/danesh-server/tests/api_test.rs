//! HTTP routes against an in-memory index and a canned model.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use danesh_core::traits::{GenerationOptions, LlmResponse};
use danesh_core::types::Message;
use danesh_core::{
    DaneshResult, Embedder, EmbeddingMode, Llm, RetrievalConfig, RetrievalOrchestrator,
    SearchStrategy,
};
use danesh_server::{create_server, AppState};
use danesh_vector_stores::{InMemoryIndex, IndexRecord};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

struct EchoLlm;

#[async_trait]
impl Llm for EchoLlm {
    async fn generate(
        &self,
        _messages: &[Message],
        _options: Option<GenerationOptions>,
    ) -> DaneshResult<LlmResponse> {
        Ok(LlmResponse::text("طبق ماده ۲، پاسخ مثبت است."))
    }

    fn model_name(&self) -> &str {
        "echo"
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

fn app() -> axum::Router {
    let index = InMemoryIndex::new("regs", 2);
    index
        .insert(
            (0..5)
                .map(|i| IndexRecord {
                    id: format!("chunk-{}", i),
                    embedding: vec![1.0, i as f32 * 0.2],
                    document: Some(format!("ماده {}", i + 1)),
                    metadata: HashMap::from([(
                        "source".to_string(),
                        Value::from(format!("regs{}.pdf", i)),
                    )]),
                })
                .collect(),
        )
        .unwrap();

    let orchestrator =
        RetrievalOrchestrator::builder(Arc::new(EchoLlm), Arc::new(AxisEmbedder), Arc::new(index))
            .config(RetrievalConfig {
                strategy: SearchStrategy::DirectQuery,
                ..Default::default()
            })
            .build()
            .unwrap();
    create_server(AppState::new(orchestrator))
}

async fn call(method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = call("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["knowledge_graph"], false);
}

#[tokio::test]
async fn ask_returns_answer_without_trace_by_default() {
    let (status, body) = call("POST", "/ask", Some(json!({"question": "شرط قبولی؟"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "طبق ماده ۲، پاسخ مثبت است.");
    assert!(body.get("trace").is_none());
}

#[tokio::test]
async fn ask_with_trace() {
    let (_, body) = call(
        "POST",
        "/ask",
        Some(json!({"question": "شرط قبولی؟", "trace": true})),
    )
    .await;
    let trace = &body["trace"];
    assert_eq!(trace["outcome"], "answered");
    assert_eq!(trace["selected_sources"].as_array().unwrap().len(), 3);
    assert_eq!(trace["expanded"], false);
}

#[tokio::test]
async fn empty_question_is_still_answered() {
    let (status, body) = call("POST", "/ask", Some(json!({"question": "  "}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "لطفاً سوال خود را وارد کنید.");
}

#[tokio::test]
async fn retrieve_respects_limit() {
    let (status, body) = call(
        "POST",
        "/retrieve",
        Some(json!({"question": "ماده", "limit": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["source"], "regs0.pdf");
    assert_eq!(results[0]["text"], "ماده 1");
}

#[tokio::test]
async fn retrieve_rejects_blank_question() {
    let (status, body) = call("POST", "/retrieve", Some(json!({"question": ""}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}
