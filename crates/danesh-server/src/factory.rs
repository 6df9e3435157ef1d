//! Builds a [`RetrievalOrchestrator`] from configuration.

use std::path::Path;
use std::sync::Arc;

use danesh_core::config::data_dir;
use danesh_core::error::DaneshResult;
use danesh_core::traits::{Llm, LlmConfig, Reranker};
use danesh_core::{DaneshConfig, RetrievalOrchestrator};

use danesh_embeddings::EmbedderFactory;
use danesh_graph_stores::GraphStoreFactory;
use danesh_llm::LlmFactory;
use danesh_rerankers::RerankerFactory;
use danesh_vector_stores::VectorIndexFactory;

/// Resolve configuration.
///
/// An explicit path wins, then `DANESH_CONFIG`, then `~/.danesh/config.toml`
/// if present. Environment overrides apply on top of any file; with no file
/// the configuration comes from defaults plus the environment.
pub fn load_config(path: Option<&Path>) -> DaneshResult<DaneshConfig> {
    let from_env_var = std::env::var("DANESH_CONFIG").ok();
    let default_file = data_dir().join("config.toml");

    let file = match (path, from_env_var.as_deref()) {
        (Some(path), _) => Some(path.to_path_buf()),
        (None, Some(env_path)) => Some(env_path.into()),
        (None, None) if default_file.exists() => Some(default_file),
        (None, None) => None,
    };

    match file {
        Some(file) => {
            tracing::info!("Loading configuration from {}", file.display());
            let mut config = DaneshConfig::from_file(&file)?;
            config.apply_env();
            Ok(config)
        }
        None => Ok(DaneshConfig::from_env()),
    }
}

/// Create every collaborator and assemble the orchestrator.
///
/// Fails when a store cannot be opened, a credential is missing or the
/// prompt template is invalid, so misconfiguration stops startup.
pub async fn create_orchestrator(config: &DaneshConfig) -> DaneshResult<RetrievalOrchestrator> {
    let llm = LlmFactory::create(config.llm.provider, config.llm.config.clone())?;
    let embedder =
        EmbedderFactory::create(config.embedder.provider, config.embedder.config.clone())?;
    let index = VectorIndexFactory::create(config.vector_store.clone()).await?;
    let template = config.prompt.load()?;

    let mut builder = RetrievalOrchestrator::builder(llm.clone(), embedder, index)
        .template(template)
        .config(config.retrieval.clone())
        .messages(config.messages.clone());

    if let Some(graph_config) = &config.graph_store {
        builder = builder.graph(GraphStoreFactory::create(graph_config)?);
    }

    if let Some(reranker_config) = &config.reranker {
        builder = builder.reranker(create_reranker(config, reranker_config, llm)?);
    }

    builder.build()
}

fn create_reranker(
    config: &DaneshConfig,
    reranker_config: &danesh_core::traits::RerankerConfig,
    llm: Arc<dyn Llm>,
) -> DaneshResult<Arc<dyn Reranker>> {
    // A named model gets its own client with deterministic sampling.
    let judge = if reranker_config.model.is_empty() {
        llm
    } else {
        let judge_config = LlmConfig {
            model: reranker_config.model.clone(),
            temperature: 0.0,
            ..config.llm.config.clone()
        };
        LlmFactory::create(config.llm.provider, judge_config)?
    };

    RerankerFactory::create(
        reranker_config.clone(),
        judge,
        config.retrieval.retry.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"retrieval": {"top_k": 4}}"#).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.retrieval.top_k, 4);
    }
}
