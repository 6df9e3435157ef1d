//! JSON node-link loader (NetworkX `node_link_data` layout).

use serde::Deserialize;
use serde_json::Value;

use danesh_core::error::{DaneshError, DaneshResult};

use crate::graph::PetgraphKnowledgeGraph;

#[derive(Debug, Deserialize)]
struct NodeLinkData {
    nodes: Vec<JsonNode>,
    #[serde(default, alias = "edges")]
    links: Vec<JsonLink>,
}

#[derive(Debug, Deserialize)]
struct JsonNode {
    id: Value,
    #[serde(default, rename = "type")]
    entity_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JsonLink {
    source: Value,
    target: Value,
    #[serde(default, rename = "type")]
    relation: Option<String>,
}

/// Node ids may be strings or numbers.
fn label(value: &Value) -> DaneshResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(DaneshError::graph_format(format!(
            "node id must be a string or number, got {}",
            other
        ))),
    }
}

/// Parse node-link JSON into a graph.
pub fn parse_node_link(json: &str) -> DaneshResult<PetgraphKnowledgeGraph> {
    let data: NodeLinkData = serde_json::from_str(json)
        .map_err(|e| DaneshError::graph_format(format!("invalid node-link JSON: {}", e)))?;

    let mut graph = PetgraphKnowledgeGraph::new();
    for node in &data.nodes {
        graph.add_entity(label(&node.id)?, node.entity_type.clone());
    }
    for link in data.links {
        let (source, target) = (label(&link.source)?, label(&link.target)?);
        if !graph.add_relation(&source, &target, link.relation) {
            tracing::warn!("Skipping edge {} -> {}: unknown node", source, target);
        }
    }
    Ok(graph)
}
