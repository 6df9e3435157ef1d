//! Configuration system for danesh.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DaneshError, DaneshResult};
use crate::retrieval::{
    PromptTemplate, RerankPolicy, ResponseMessages, RetrievalConfig, SearchStrategy,
};
use crate::traits::{
    EmbedderConfig, EmbedderProvider, GraphStoreConfig, LlmConfig, LlmProvider, RerankerConfig,
    VectorStoreConfig, VectorStoreProvider,
};

/// Provider configuration with type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmProviderConfig {
    /// Provider type.
    pub provider: LlmProvider,
    /// Provider-specific configuration.
    #[serde(flatten)]
    pub config: LlmConfig,
}

impl Default for LlmProviderConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Gemini,
            config: LlmConfig {
                model: "gemini-1.5-flash".to_string(),
                ..Default::default()
            },
        }
    }
}

/// Embedder provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedderProviderConfig {
    /// Provider type.
    pub provider: EmbedderProvider,
    /// Provider-specific configuration.
    #[serde(flatten)]
    pub config: EmbedderConfig,
}

impl Default for EmbedderProviderConfig {
    fn default() -> Self {
        Self {
            provider: EmbedderProvider::Gemini,
            config: EmbedderConfig::default(),
        }
    }
}

/// Where the answer template comes from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Path to a template file. Takes precedence over `template`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rag_prompt_path: Option<PathBuf>,
    /// Inline template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl PromptConfig {
    /// Load and validate the template, falling back to the built-in one.
    pub fn load(&self) -> DaneshResult<PromptTemplate> {
        match (&self.rag_prompt_path, &self.template) {
            (Some(path), _) => PromptTemplate::from_file(path),
            (None, Some(template)) => PromptTemplate::new(template.clone()),
            (None, None) => Ok(PromptTemplate::default()),
        }
    }
}

/// Main danesh configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaneshConfig {
    /// LLM configuration.
    pub llm: LlmProviderConfig,
    /// Embedder configuration.
    pub embedder: EmbedderProviderConfig,
    /// Vector index configuration.
    pub vector_store: VectorStoreConfig,
    /// Knowledge graph configuration (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_store: Option<GraphStoreConfig>,
    /// Reranker configuration (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reranker: Option<RerankerConfig>,
    /// Retrieval pipeline settings.
    pub retrieval: RetrievalConfig,
    /// Answer template source.
    pub prompt: PromptConfig,
    /// User-facing fallback messages.
    pub messages: ResponseMessages,
}

impl Default for DaneshConfig {
    fn default() -> Self {
        Self {
            llm: LlmProviderConfig::default(),
            embedder: EmbedderProviderConfig::default(),
            vector_store: VectorStoreConfig::default(),
            graph_store: None,
            reranker: Some(RerankerConfig::default()),
            retrieval: RetrievalConfig::default(),
            prompt: PromptConfig::default(),
            messages: ResponseMessages::default(),
        }
    }
}

/// Default data directory, `~/.danesh`.
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".danesh"))
        .unwrap_or_else(|| PathBuf::from(".danesh"))
}

impl DaneshConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> DaneshResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| DaneshError::Configuration(e.to_string()))
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| DaneshError::Configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| DaneshError::Configuration(e.to_string())),
            _ => Err(DaneshError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from `DANESH_*` and provider key variables.
    pub fn apply_env(&mut self) {
        if let Ok(model) = std::env::var("DANESH_LLM_MODEL") {
            self.llm.config.model = model;
        }
        if let Ok(model) = std::env::var("DANESH_EMBEDDING_MODEL") {
            self.embedder.config.model = model;
        }

        let key_var = match self.llm.provider {
            LlmProvider::Gemini => Some("GOOGLE_API_KEY"),
            LlmProvider::OpenAI => Some("OPENAI_API_KEY"),
            LlmProvider::Anthropic => Some("ANTHROPIC_API_KEY"),
            LlmProvider::Ollama => None,
        };
        if let Some(Ok(key)) = key_var.map(std::env::var) {
            self.llm.config.api_key.get_or_insert(key);
        }
        let key_var = match self.embedder.provider {
            EmbedderProvider::Gemini => Some("GOOGLE_API_KEY"),
            EmbedderProvider::OpenAI => Some("OPENAI_API_KEY"),
            EmbedderProvider::Ollama => None,
        };
        if let Some(Ok(key)) = key_var.map(std::env::var) {
            self.embedder.config.api_key.get_or_insert(key);
        }

        if let Ok(provider) = std::env::var("DANESH_VECTOR_STORE_PROVIDER") {
            self.vector_store.provider = match provider.to_lowercase().as_str() {
                "in_memory" | "memory" => VectorStoreProvider::InMemory,
                "sqlite_vec" | "sqlite" => VectorStoreProvider::SqliteVec,
                _ => VectorStoreProvider::Chroma,
            };
        }
        if let Ok(collection) = std::env::var("DANESH_COLLECTION") {
            self.vector_store.collection_name = collection;
        }
        if let Ok(url) = std::env::var("DANESH_CHROMA_URL") {
            self.vector_store.config["url"] = serde_json::Value::String(url);
        }
        if let Ok(path) = std::env::var("DANESH_GRAPH_PATH") {
            self.graph_store = Some(GraphStoreConfig::new(path));
        }
        if let Ok(path) = std::env::var("DANESH_PROMPT_PATH") {
            self.prompt.rag_prompt_path = Some(PathBuf::from(path));
        }

        if let Ok(strategy) = std::env::var("DANESH_SEARCH_STRATEGY") {
            match strategy.to_lowercase().as_str() {
                "hyde" => self.retrieval.strategy = SearchStrategy::Hyde,
                "direct_query" => self.retrieval.strategy = SearchStrategy::DirectQuery,
                "question_as_document" => {
                    self.retrieval.strategy = SearchStrategy::QuestionAsDocument
                }
                other => tracing::warn!("Ignoring unknown DANESH_SEARCH_STRATEGY '{}'", other),
            }
        }
        if let Ok(policy) = std::env::var("DANESH_RERANK_POLICY") {
            match policy.to_lowercase().as_str() {
                "always" => self.retrieval.rerank_policy = RerankPolicy::Always,
                "above_top_n" => self.retrieval.rerank_policy = RerankPolicy::AboveTopN,
                "never" => self.retrieval.rerank_policy = RerankPolicy::Never,
                other => tracing::warn!("Ignoring unknown DANESH_RERANK_POLICY '{}'", other),
            }
        }
        if let Some(top_k) = env_number("DANESH_TOP_K") {
            self.retrieval.top_k = top_k;
        }
        if let Some(top_n) = env_number("DANESH_RERANK_TOP_N") {
            self.retrieval.rerank_top_n = top_n;
        }
        if let Some(delay) = env_number("DANESH_COURTESY_DELAY_MS") {
            self.retrieval.courtesy_delay_ms = delay as u64;
        }
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> DaneshConfigBuilder {
        DaneshConfigBuilder::default()
    }
}

fn env_number(name: &str) -> Option<usize> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring non-numeric {}='{}'", name, raw);
            None
        }
    }
}

/// Builder for DaneshConfig.
#[derive(Default)]
pub struct DaneshConfigBuilder {
    config: DaneshConfig,
}

impl DaneshConfigBuilder {
    /// Set LLM configuration.
    pub fn llm(mut self, config: LlmProviderConfig) -> Self {
        self.config.llm = config;
        self
    }

    /// Set embedder configuration.
    pub fn embedder(mut self, config: EmbedderProviderConfig) -> Self {
        self.config.embedder = config;
        self
    }

    /// Set vector index configuration.
    pub fn vector_store(mut self, config: VectorStoreConfig) -> Self {
        self.config.vector_store = config;
        self
    }

    /// Set knowledge graph configuration.
    pub fn graph_store(mut self, config: GraphStoreConfig) -> Self {
        self.config.graph_store = Some(config);
        self
    }

    /// Set or clear the reranker.
    pub fn reranker(mut self, config: Option<RerankerConfig>) -> Self {
        self.config.reranker = config;
        self
    }

    /// Set retrieval settings.
    pub fn retrieval(mut self, config: RetrievalConfig) -> Self {
        self.config.retrieval = config;
        self
    }

    /// Set the answer template file.
    pub fn rag_prompt_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.prompt.rag_prompt_path = Some(path.into());
        self
    }

    /// Set user-facing messages.
    pub fn messages(mut self, messages: ResponseMessages) -> Self {
        self.config.messages = messages;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> DaneshConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(ext: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(&format!(".{}", ext))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_match_deployment() {
        let config = DaneshConfig::default();
        assert_eq!(config.llm.provider, LlmProvider::Gemini);
        assert_eq!(config.llm.config.model, "gemini-1.5-flash");
        assert_eq!(config.embedder.config.model, "models/text-embedding-004");
        assert_eq!(config.vector_store.collection_name, "ikiu_regulations");
        assert!(config.graph_store.is_none());
        assert!(config.reranker.is_some());
    }

    #[test]
    fn test_from_toml() {
        let file = write_config(
            "toml",
            r#"
[llm]
provider = "ollama"
model = "llama3"

[vector_store]
provider = "in_memory"
collection_name = "qa_pairs"
path = "index.json"

[graph_store]
path = "kg.graphml"

[retrieval]
strategy = "question_as_document"
rerank_policy = "never"
"#,
        );

        let config = DaneshConfig::from_file(file.path()).unwrap();
        assert_eq!(config.llm.provider, LlmProvider::Ollama);
        assert_eq!(config.llm.config.model, "llama3");
        assert_eq!(config.vector_store.provider, VectorStoreProvider::InMemory);
        assert_eq!(config.vector_store.get_str("path"), Some("index.json"));
        assert_eq!(
            config.graph_store.unwrap().path,
            PathBuf::from("kg.graphml")
        );
        assert_eq!(config.retrieval.strategy, SearchStrategy::QuestionAsDocument);
        assert_eq!(config.retrieval.rerank_policy, RerankPolicy::Never);
        assert_eq!(config.retrieval.top_k, 10);
    }

    #[test]
    fn test_from_yaml_and_json() {
        let yaml = write_config("yaml", "retrieval:\n  top_k: 20\n  rerank_top_n: 5\n");
        let config = DaneshConfig::from_file(yaml.path()).unwrap();
        assert_eq!(config.retrieval.top_k, 20);
        assert_eq!(config.retrieval.rerank_top_n, 5);

        let json = write_config("json", r#"{"retrieval": {"graph_depth": 3}}"#);
        let config = DaneshConfig::from_file(json.path()).unwrap();
        assert_eq!(config.retrieval.graph_depth, 3);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_config("ini", "x=1");
        assert!(matches!(
            DaneshConfig::from_file(file.path()),
            Err(DaneshError::Configuration(_))
        ));
    }

    #[test]
    fn test_prompt_config_prefers_file() {
        let file = write_config("txt", "{vector_context}{graph_context}{user_question}");
        let prompt = PromptConfig {
            rag_prompt_path: Some(file.path().to_path_buf()),
            template: Some("ignored".to_string()),
        };
        assert_eq!(
            prompt.load().unwrap().as_str(),
            "{vector_context}{graph_context}{user_question}"
        );

        let inline = PromptConfig {
            rag_prompt_path: None,
            template: Some("{vector_context} only".to_string()),
        };
        assert!(inline.load().is_err());
    }

    #[test]
    fn test_builder() {
        let config = DaneshConfig::builder()
            .graph_store(GraphStoreConfig::new("graph.json"))
            .reranker(None)
            .retrieval(RetrievalConfig::qa_pairs())
            .build();
        assert!(config.reranker.is_none());
        assert!(config.graph_store.is_some());
        assert_eq!(config.retrieval.strategy, SearchStrategy::QuestionAsDocument);
    }
}
