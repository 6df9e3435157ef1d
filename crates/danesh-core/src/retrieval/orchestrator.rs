//! The retrieval orchestrator: question in, grounded answer out.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::config::{ResponseMessages, RetrievalConfig};
use super::graph_context::summarize_graph_context;
use super::prompt::{format_vector_context, hypothetical_answer_prompt, PromptTemplate};
use super::rerank_parser::first_n;
use crate::error::{DaneshError, DaneshResult};
use crate::traits::{Embedder, KnowledgeGraph, Llm, Reranker, VectorIndex};
use crate::types::{documents_from_hits, RetrievedDocument};

/// How a query ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOutcome {
    /// The generator produced an answer.
    Answered,
    /// The question was empty; no service was called.
    EmptyQuestion,
    /// Vector search returned nothing.
    NoCandidatesFound,
    /// The reranker kept none of the candidates.
    NothingSelected,
    /// Final generation failed.
    GenerationFailed,
}

/// Per-query diagnostics alongside the answer.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerTrace {
    pub answer: String,
    pub outcome: QueryOutcome,
    /// Text that was embedded for the vector search.
    pub search_text: String,
    /// Whether a hypothetical answer replaced the question as search text.
    pub expanded: bool,
    pub candidate_sources: Vec<String>,
    pub selected_sources: Vec<String>,
    /// Whether a rerank judgement was attempted.
    pub reranked: bool,
    /// Whether selection fell back to the first candidates after a failed rerank.
    pub rerank_fell_back: bool,
    /// Graph section substituted into the prompt.
    pub graph_context: Option<String>,
}

impl AnswerTrace {
    fn new(answer: String, outcome: QueryOutcome, search_text: String) -> Self {
        Self {
            answer,
            outcome,
            search_text,
            expanded: false,
            candidate_sources: Vec::new(),
            selected_sources: Vec::new(),
            reranked: false,
            rerank_fell_back: false,
            graph_context: None,
        }
    }
}

/// Sleeps before every generative call except the first in a query.
struct Pacer {
    delay: Duration,
    calls: usize,
}

impl Pacer {
    fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            calls: 0,
        }
    }

    async fn before_call(&mut self) {
        if self.calls > 0 && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.calls += 1;
    }
}

struct Selection {
    documents: Vec<RetrievedDocument>,
    reranked: bool,
    fell_back: bool,
}

/// Answers questions from a vector index, an optional knowledge graph and
/// a generative model.
///
/// Holds no per-query state, so one instance can serve concurrent queries.
pub struct RetrievalOrchestrator {
    llm: Arc<dyn Llm>,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    graph: Option<Arc<dyn KnowledgeGraph>>,
    reranker: Option<Arc<dyn Reranker>>,
    template: PromptTemplate,
    config: RetrievalConfig,
    messages: ResponseMessages,
}

impl RetrievalOrchestrator {
    pub fn builder(
        llm: Arc<dyn Llm>,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
    ) -> RetrievalOrchestratorBuilder {
        RetrievalOrchestratorBuilder {
            llm,
            embedder,
            index,
            graph: None,
            reranker: None,
            template: PromptTemplate::default(),
            config: RetrievalConfig::default(),
            messages: ResponseMessages::default(),
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn has_graph(&self) -> bool {
        self.graph.is_some()
    }

    /// Answer a question. Never fails; degraded paths return a fixed message.
    pub async fn answer_question(&self, question: &str) -> String {
        self.answer_question_traced(question).await.answer
    }

    /// Answer a question and report how the pipeline got there.
    pub async fn answer_question_traced(&self, question: &str) -> AnswerTrace {
        let question = question.trim();
        if question.is_empty() {
            return AnswerTrace::new(
                self.messages.empty_question.clone(),
                QueryOutcome::EmptyQuestion,
                String::new(),
            );
        }

        let mut pacer = Pacer::new(self.config.courtesy_delay_ms);

        let (search_text, expanded) = if self.config.strategy.expands_query() {
            pacer.before_call().await;
            self.expand_question(question).await
        } else {
            (question.to_string(), false)
        };

        let candidates = self.retrieve_candidates(&search_text).await;
        let mut trace = AnswerTrace::new(String::new(), QueryOutcome::Answered, search_text);
        trace.expanded = expanded;
        trace.candidate_sources = sources(&candidates);

        if candidates.is_empty() {
            tracing::info!("No candidates found, skipping generation");
            trace.answer = self.messages.not_found.clone();
            trace.outcome = QueryOutcome::NoCandidatesFound;
            return trace;
        }

        let selection = self.select(question, &candidates, &mut pacer).await;
        trace.reranked = selection.reranked;
        trace.rerank_fell_back = selection.fell_back;
        trace.selected_sources = sources(&selection.documents);

        if selection.documents.is_empty() {
            trace.answer = self.messages.nothing_selected.clone();
            trace.outcome = QueryOutcome::NothingSelected;
            return trace;
        }

        let graph_context = self.graph_context(&selection.documents);
        let prompt = self.template.render(
            &format_vector_context(&selection.documents),
            &graph_context,
            question,
        );
        trace.graph_context = Some(graph_context);
        tracing::debug!("Final prompt:\n{}", prompt);

        pacer.before_call().await;
        match self.llm.complete(&prompt).await {
            Ok(answer) => {
                tracing::info!(
                    "Answered from {} documents (reranked: {})",
                    selection.documents.len(),
                    selection.reranked
                );
                trace.answer = answer;
            }
            Err(e) => {
                tracing::error!("Final answer generation failed: {}", e);
                trace.answer = self.messages.generation_failed.clone();
                trace.outcome = QueryOutcome::GenerationFailed;
            }
        }
        trace
    }

    /// Embed `search_text` and return the top-k documents.
    ///
    /// Failures are logged and reported as an empty list.
    pub async fn retrieve_candidates(&self, search_text: &str) -> Vec<RetrievedDocument> {
        match self.search(search_text, self.config.top_k).await {
            Ok(documents) => {
                tracing::info!("Found {} candidates in vector index", documents.len());
                documents
            }
            Err(e) => {
                tracing::error!("Vector search failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Embed `text` with the configured mode and query the index.
    pub async fn search(&self, text: &str, limit: usize) -> DaneshResult<Vec<RetrievedDocument>> {
        let mode = self.config.strategy.embedding_mode();
        let vector = self.embedder.embed(text, mode).await?;

        if let Some(expected) = self.index.dimension() {
            if vector.len() != expected {
                return Err(DaneshError::dimension_mismatch(expected, vector.len()));
            }
        }

        let hits = self.index.search(&vector, limit).await?;
        Ok(documents_from_hits(hits))
    }

    async fn expand_question(&self, question: &str) -> (String, bool) {
        tracing::debug!("Generating hypothetical answer for search");
        match self.llm.complete(&hypothetical_answer_prompt(question)).await {
            Ok(expanded) => (expanded, true),
            Err(e) => {
                tracing::warn!("Hypothetical answer failed, searching with question: {}", e);
                (question.to_string(), false)
            }
        }
    }

    async fn select(
        &self,
        question: &str,
        candidates: &[RetrievedDocument],
        pacer: &mut Pacer,
    ) -> Selection {
        let top_n = self.config.rerank_top_n;
        let reranker = match &self.reranker {
            Some(reranker)
                if self
                    .config
                    .rerank_policy
                    .should_rerank(candidates.len(), top_n) =>
            {
                reranker
            }
            _ => {
                return Selection {
                    documents: first_n(candidates, top_n),
                    reranked: false,
                    fell_back: false,
                }
            }
        };

        pacer.before_call().await;
        match reranker.rerank(question, candidates, top_n).await {
            Ok(mut documents) => {
                documents.truncate(top_n);
                tracing::info!("Reranker selected {} of {}", documents.len(), candidates.len());
                Selection {
                    documents,
                    reranked: true,
                    fell_back: false,
                }
            }
            Err(e) => {
                tracing::warn!("Rerank failed, keeping first {}: {}", top_n, e);
                Selection {
                    documents: first_n(candidates, top_n),
                    reranked: true,
                    fell_back: true,
                }
            }
        }
    }

    fn graph_context(&self, documents: &[RetrievedDocument]) -> String {
        match &self.graph {
            None => self.messages.graph_disabled.clone(),
            Some(graph) => summarize_graph_context(graph.as_ref(), documents, self.config.graph_depth)
                .unwrap_or_else(|| self.messages.graph_no_matches.clone()),
        }
    }
}

fn sources(documents: &[RetrievedDocument]) -> Vec<String> {
    documents.iter().map(|doc| doc.source.clone()).collect()
}

/// Builder for [`RetrievalOrchestrator`].
pub struct RetrievalOrchestratorBuilder {
    llm: Arc<dyn Llm>,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    graph: Option<Arc<dyn KnowledgeGraph>>,
    reranker: Option<Arc<dyn Reranker>>,
    template: PromptTemplate,
    config: RetrievalConfig,
    messages: ResponseMessages,
}

impl RetrievalOrchestratorBuilder {
    pub fn graph(mut self, graph: Arc<dyn KnowledgeGraph>) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    pub fn template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn config(mut self, config: RetrievalConfig) -> Self {
        self.config = config;
        self
    }

    pub fn messages(mut self, messages: ResponseMessages) -> Self {
        self.messages = messages;
        self
    }

    /// Validate the settings and collaborators.
    ///
    /// Fails when a fallback message is blank or the embedder and index
    /// disagree on dimensionality.
    pub fn build(self) -> DaneshResult<RetrievalOrchestrator> {
        self.config
            .validate()
            .map_err(|e| DaneshError::Configuration(e.to_string()))?;
        self.messages
            .validate()
            .map_err(DaneshError::Configuration)?;

        if let Some(expected) = self.index.dimension() {
            let actual = self.embedder.dimension();
            if actual != expected {
                return Err(DaneshError::dimension_mismatch(expected, actual));
            }
        }

        tracing::info!(
            "Retrieval orchestrator ready: collection '{}', model '{}', strategy {:?}, graph {}",
            self.index.collection_name(),
            self.llm.model_name(),
            self.config.strategy,
            if self.graph.is_some() { "enabled" } else { "disabled" }
        );

        Ok(RetrievalOrchestrator {
            llm: self.llm,
            embedder: self.embedder,
            index: self.index,
            graph: self.graph,
            reranker: self.reranker,
            template: self.template,
            config: self.config,
            messages: self.messages,
        })
    }
}
