//! Question answering over the vector index and knowledge graph.
//!
//! The pipeline is linear: expand the question (optional), retrieve
//! candidates, rerank (policy-dependent), summarize the graph neighbourhood,
//! render the prompt and generate. Every per-query failure degrades to a
//! fallback instead of an error.

mod config;
mod evaluation;
mod graph_context;
mod orchestrator;
mod prompt;
mod rerank_parser;
mod retry;

pub use config::{RerankPolicy, ResponseMessages, RetrievalConfig, SearchStrategy};
pub use evaluation::{
    load_dataset, EvaluationDetail, EvaluationItem, EvaluationReport, RetrievalEvaluator,
};
pub use graph_context::{match_entities, summarize_graph_context};
pub use orchestrator::{AnswerTrace, QueryOutcome, RetrievalOrchestrator, RetrievalOrchestratorBuilder};
pub use prompt::{
    format_vector_context, hypothetical_answer_prompt, rerank_prompt, PromptTemplate,
    DEFAULT_RAG_TEMPLATE,
};
pub use rerank_parser::{first_n, parse_rerank_indices, select_by_indices};
pub use retry::{retry_with_backoff, RetryPolicy};
