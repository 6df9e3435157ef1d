//! Prompt construction: the answer template plus the expansion and
//! re-ranking prompts.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{DaneshError, DaneshResult};
use crate::types::RetrievedDocument;

pub const VECTOR_CONTEXT: &str = "vector_context";
pub const GRAPH_CONTEXT: &str = "graph_context";
pub const USER_QUESTION: &str = "user_question";

const REQUIRED_PLACEHOLDERS: [&str; 3] = [VECTOR_CONTEXT, GRAPH_CONTEXT, USER_QUESTION];

/// `{{` and `}}` are literal braces; `{name}` is a placeholder.
static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{|\}\}|\{(vector_context|graph_context|user_question)\}")
        .expect("valid regex")
});

/// Built-in answer template for Persian regulation documents.
pub const DEFAULT_RAG_TEMPLATE: &str = "شما یک دستیار هوش مصنوعی هستید که به سوالات مربوط به آیین‌نامه‌های دانشگاهی پاسخ می‌دهید.
بر اساس اطلاعات و بافتار زیر، به سوال کاربر پاسخ دهید. پاسخ شما باید دقیق و فقط بر اساس اطلاعات ارائه شده باشد.
اگر پاسخ در اطلاعات زیر وجود ندارد، این موضوع را صریحاً بیان کنید.

[اسناد بازیابی شده]
{vector_context}

[بافتار بازیابی شده از گراف دانش]
{graph_context}

[سوال کاربر]
{user_question}

[پاسخ شما]
";

/// Answer template with three placeholders, checked at construction.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Parse a template, rejecting any that lacks a required placeholder.
    pub fn new(template: impl Into<String>) -> DaneshResult<Self> {
        let template = template.into();
        let found: HashSet<&str> = TOKEN
            .captures_iter(&template)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect();

        let missing: Vec<&str> = REQUIRED_PLACEHOLDERS
            .iter()
            .copied()
            .filter(|name| !found.contains(name))
            .collect();
        if !missing.is_empty() {
            return Err(DaneshError::Configuration(format!(
                "prompt template is missing placeholders: {}",
                missing
                    .iter()
                    .map(|name| format!("{{{}}}", name))
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        Ok(Self { template })
    }

    /// Read a template file. A missing file stops startup.
    pub fn from_file(path: impl AsRef<Path>) -> DaneshResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DaneshError::Configuration(format!(
                "could not read prompt template {}: {}",
                path.display(),
                e
            ))
        })?;
        tracing::info!("Loaded RAG prompt template from {}", path.display());
        Self::new(content)
    }

    /// Substitute all placeholders in a single pass.
    ///
    /// Inserted text is never scanned again, so a question that itself
    /// contains `{graph_context}` stays verbatim.
    pub fn render(&self, vector_context: &str, graph_context: &str, user_question: &str) -> String {
        TOKEN
            .replace_all(&self.template, |caps: &Captures| match caps.get(1) {
                Some(name) => match name.as_str() {
                    VECTOR_CONTEXT => vector_context.to_string(),
                    GRAPH_CONTEXT => graph_context.to_string(),
                    _ => user_question.to_string(),
                },
                None => caps[0][..1].to_string(),
            })
            .into_owned()
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_RAG_TEMPLATE.to_string(),
        }
    }
}

/// Render the selected documents as `Source:`/`Content:` blocks.
pub fn format_vector_context(documents: &[RetrievedDocument]) -> String {
    documents
        .iter()
        .map(|doc| format!("Source: {}\nContent: {}\n\n", doc.source, doc.text))
        .collect()
}

/// Prompt asking for a rich hypothetical answer to embed instead of the question.
pub fn hypothetical_answer_prompt(question: &str) -> String {
    format!(
        "لطفاً به این سوال یک پاسخ جامع و کامل بدهید. این پاسخ برای جستجوی اسناد مرتبط استفاده خواهد شد، بنابراین باید شامل کلمات کلیدی و مفاهیم احتمالی باشد.\nسوال: {}",
        question
    )
}

/// Prompt asking the judge for the `top_n` most relevant document numbers.
pub fn rerank_prompt(question: &str, candidates: &[RetrievedDocument], top_n: usize) -> String {
    let documents: String = candidates
        .iter()
        .enumerate()
        .map(|(i, doc)| format!("Document {}:\n{}\n\n", i + 1, doc.text))
        .collect();

    format!(
        "From the following documents, identify the top {} that are MOST relevant to the user's question.\n\
         User Question: \"{}\"\n\
         Documents:\n{}\
         Respond with a comma-separated list of the document numbers. Example: \"3,1,5\"",
        top_n, question, documents
    )
}
