//! Factory for loading knowledge graphs.

use std::path::Path;
use std::sync::Arc;

use danesh_core::error::{DaneshError, DaneshResult};
use danesh_core::traits::{GraphFormat, GraphStoreConfig, KnowledgeGraph};

use crate::graph::PetgraphKnowledgeGraph;
use crate::graphml::parse_graphml;
use crate::node_link::parse_node_link;

/// Factory for loading knowledge graphs.
pub struct GraphStoreFactory;

impl GraphStoreFactory {
    /// Load the graph file named in `config`.
    ///
    /// A missing file is [`ErrorCode::GrpGraphUnavailable`]; an unparseable
    /// one is [`ErrorCode::GrpInvalidFormat`].
    ///
    /// [`ErrorCode::GrpGraphUnavailable`]: danesh_core::error::ErrorCode::GrpGraphUnavailable
    /// [`ErrorCode::GrpInvalidFormat`]: danesh_core::error::ErrorCode::GrpInvalidFormat
    pub fn load(config: &GraphStoreConfig) -> DaneshResult<PetgraphKnowledgeGraph> {
        let path = config.path.as_path();
        let format = resolve_format(path, config.format)?;

        let content = std::fs::read_to_string(path).map_err(|e| {
            DaneshError::graph_unavailable(format!(
                "Cannot read knowledge graph {}: {}",
                path.display(),
                e
            ))
        })?;

        let graph = match format {
            GraphFormat::Json => parse_node_link(&content)?,
            GraphFormat::GraphMl | GraphFormat::Auto => parse_graphml(&content)?,
        };

        tracing::info!(
            "Loaded knowledge graph from {} ({} nodes, {} edges)",
            path.display(),
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    /// Load and wrap for sharing with the orchestrator.
    pub fn create(config: &GraphStoreConfig) -> DaneshResult<Arc<dyn KnowledgeGraph>> {
        Ok(Arc::new(Self::load(config)?))
    }
}

fn resolve_format(path: &Path, format: GraphFormat) -> DaneshResult<GraphFormat> {
    if format != GraphFormat::Auto {
        return Ok(format);
    }
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("graphml") | Some("xml") => Ok(GraphFormat::GraphMl),
        Some("json") => Ok(GraphFormat::Json),
        _ => Err(DaneshError::graph_format(format!(
            "Cannot infer graph format from {}; set format explicitly",
            path.display()
        ))),
    }
}
