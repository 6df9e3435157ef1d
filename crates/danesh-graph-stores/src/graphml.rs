//! GraphML loader.
//!
//! Reads the subset of GraphML that NetworkX `write_graphml` produces:
//! `<key>` declarations, `<node id>` elements and `<edge source target>`
//! elements, each with optional `<data>` children. The only attribute kept
//! is `type`, on nodes and edges.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use danesh_core::error::{DaneshError, DaneshResult};

use crate::graph::PetgraphKnowledgeGraph;

const TYPE_ATTR: &str = "type";

#[derive(Debug)]
enum Element {
    Node(String, Option<String>),
    Edge(String, String, Option<String>),
}

fn attribute(e: &BytesStart<'_>, name: &[u8]) -> DaneshResult<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| DaneshError::graph_format(format!("bad attribute: {}", e)))?;
        if attr.key.as_ref() == name {
            let value = attr
                .unescape_value()
                .map_err(|e| DaneshError::graph_format(format!("bad attribute value: {}", e)))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn required(e: &BytesStart<'_>, name: &str) -> DaneshResult<String> {
    attribute(e, name.as_bytes())?.ok_or_else(|| {
        DaneshError::graph_format(format!(
            "<{}> is missing the '{}' attribute",
            String::from_utf8_lossy(e.local_name().as_ref()),
            name
        ))
    })
}

/// Parse GraphML text into a graph.
pub fn parse_graphml(xml: &str) -> DaneshResult<PetgraphKnowledgeGraph> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // key id -> attr.name
    let mut keys: HashMap<String, String> = HashMap::new();
    let mut elements: Vec<Element> = Vec::new();
    let mut current: Option<Element> = None;
    let mut data_key: Option<String> = None;
    let mut saw_graph = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            DaneshError::graph_format(format!(
                "malformed GraphML at byte {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        let self_closing = matches!(event, Event::Empty(_));
        match event {
            Event::Start(e) | Event::Empty(e) => {
                match e.local_name().as_ref() {
                    b"graph" => saw_graph = true,
                    b"key" => {
                        if let (Some(id), Some(name)) =
                            (attribute(&e, b"id")?, attribute(&e, b"attr.name")?)
                        {
                            keys.insert(id, name);
                        }
                    }
                    b"node" => {
                        let node = Element::Node(required(&e, "id")?, None);
                        if self_closing {
                            elements.push(node);
                        } else {
                            current = Some(node);
                        }
                    }
                    b"edge" => {
                        let edge =
                            Element::Edge(required(&e, "source")?, required(&e, "target")?, None);
                        if self_closing {
                            elements.push(edge);
                        } else {
                            current = Some(edge);
                        }
                    }
                    b"data" if !self_closing => data_key = attribute(&e, b"key")?,
                    _ => {}
                }
            }
            Event::Text(t) => {
                let Some(key) = data_key.as_ref() else {
                    continue;
                };
                if keys.get(key).map(String::as_str) != Some(TYPE_ATTR) {
                    continue;
                }
                let value = t
                    .unescape()
                    .map_err(|e| DaneshError::graph_format(format!("bad text: {}", e)))?
                    .into_owned();
                match current.as_mut() {
                    Some(Element::Node(_, kind)) | Some(Element::Edge(_, _, kind)) => {
                        *kind = Some(value)
                    }
                    None => {}
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"data" => data_key = None,
                b"node" | b"edge" => elements.extend(current.take()),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_graph {
        return Err(DaneshError::graph_format("no <graph> element found"));
    }

    let mut graph = PetgraphKnowledgeGraph::new();
    let mut pending_edges = Vec::new();
    for element in elements {
        match element {
            Element::Node(id, kind) => {
                graph.add_entity(id, kind);
            }
            edge => pending_edges.push(edge),
        }
    }
    for edge in pending_edges {
        if let Element::Edge(source, target, kind) = edge {
            if !graph.add_relation(&source, &target, kind) {
                tracing::warn!("Skipping edge {} -> {}: unknown node", source, target);
            }
        }
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use danesh_core::traits::KnowledgeGraph;

    const SAMPLE: &str = r#"<?xml version='1.0' encoding='utf-8'?>
<graphml xmlns="http://graphml.graphdrawing.org/xmlns">
  <key id="d1" for="edge" attr.name="type" attr.type="string" />
  <key id="d0" for="node" attr.name="type" attr.type="string" />
  <graph edgedefault="undirected">
    <node id="آیین‌نامه آموزشی">
      <data key="d0">regulation</data>
    </node>
    <node id="دانشجو" />
    <node id="شورای آموزشی">
      <data key="d0">organization</data>
    </node>
    <edge source="آیین‌نامه آموزشی" target="دانشجو">
      <data key="d1">applies_to</data>
    </edge>
    <edge source="دانشجو" target="شورای آموزشی" />
    <edge source="دانشجو" target="ناشناخته" />
  </graph>
</graphml>"#;

    #[test]
    fn test_parse_networkx_output() {
        let graph = parse_graphml(SAMPLE).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(
            graph.entity("شورای آموزشی").unwrap().entity_type.as_deref(),
            Some("organization")
        );
        assert!(graph.entity("دانشجو").unwrap().entity_type.is_none());
        assert_eq!(
            graph.neighbors("آیین‌نامه آموزشی", 2),
            vec!["دانشجو", "شورای آموزشی"]
        );
    }

    #[test]
    fn test_node_without_id_is_rejected() {
        let xml = r#"<graphml><graph><node /></graph></graphml>"#;
        assert!(parse_graphml(xml).is_err());
    }

    #[test]
    fn test_not_graphml() {
        assert!(parse_graphml("<html><body/></html>").is_err());
    }
}
