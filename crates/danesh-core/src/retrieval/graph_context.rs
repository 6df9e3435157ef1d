//! Plain-text neighbourhood summaries for the entities mentioned in the
//! selected documents.

use std::collections::HashSet;

use crate::traits::KnowledgeGraph;
use crate::types::RetrievedDocument;

/// Entity labels that occur in any document, case-insensitively.
///
/// Each label is reported once, in the order it is first found while
/// scanning documents in order. Blank labels never match.
pub fn match_entities(labels: &[String], documents: &[RetrievedDocument]) -> Vec<String> {
    let lowered: Vec<(String, &String)> = labels
        .iter()
        .filter(|label| !label.trim().is_empty())
        .map(|label| (label.to_lowercase(), label))
        .collect();

    let mut seen = HashSet::new();
    let mut matched = Vec::new();
    for doc in documents {
        let text = doc.text.to_lowercase();
        for (needle, label) in &lowered {
            if text.contains(needle.as_str()) && seen.insert(*label) {
                matched.push((*label).clone());
            }
        }
    }
    matched
}

/// One line per matched entity listing what lies within `depth` hops.
///
/// Returns `None` when no entity label occurs in the documents.
pub fn summarize_graph_context(
    graph: &dyn KnowledgeGraph,
    documents: &[RetrievedDocument],
    depth: usize,
) -> Option<String> {
    let matched = match_entities(&graph.entity_labels(), documents);
    if matched.is_empty() {
        return None;
    }
    tracing::debug!("Graph augmentation matched {} entities", matched.len());

    let lines: Vec<String> = matched
        .iter()
        .map(|label| {
            let related = graph.neighbors(label, depth);
            let related = if related.is_empty() {
                "None".to_string()
            } else {
                related.join(", ")
            };
            format!("- {}: related concepts: {}", label, related)
        })
        .collect();

    Some(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, VecDeque};

    /// Undirected adjacency list.
    struct AdjacencyGraph {
        labels: Vec<String>,
        edges: HashMap<String, Vec<String>>,
    }

    impl AdjacencyGraph {
        fn new(labels: &[&str], edges: &[(&str, &str)]) -> Self {
            let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
            for (a, b) in edges {
                adjacency.entry(a.to_string()).or_default().push(b.to_string());
                adjacency.entry(b.to_string()).or_default().push(a.to_string());
            }
            Self {
                labels: labels.iter().map(|s| s.to_string()).collect(),
                edges: adjacency,
            }
        }
    }

    impl KnowledgeGraph for AdjacencyGraph {
        fn entity_labels(&self) -> Vec<String> {
            self.labels.clone()
        }

        fn neighbors(&self, label: &str, depth: usize) -> Vec<String> {
            let mut seen: HashSet<String> = HashSet::from([label.to_string()]);
            let mut out = Vec::new();
            let mut queue = VecDeque::from([(label.to_string(), 0)]);
            while let Some((node, d)) = queue.pop_front() {
                if d == depth {
                    continue;
                }
                for next in self.edges.get(&node).into_iter().flatten() {
                    if seen.insert(next.clone()) {
                        out.push(next.clone());
                        queue.push_back((next.clone(), d + 1));
                    }
                }
            }
            out
        }

        fn node_count(&self) -> usize {
            self.labels.len()
        }

        fn edge_count(&self) -> usize {
            self.edges.values().map(Vec::len).sum::<usize>() / 2
        }
    }

    fn doc(text: &str) -> RetrievedDocument {
        RetrievedDocument::new("d", text, "src")
    }

    #[test]
    fn test_isolated_nodes_report_none() {
        let graph = AdjacencyGraph::new(&["Ministry of Health", "Ministry of Science"], &[]);
        let docs = vec![doc(
            "Approved by the ministry of science and the Ministry of Health.",
        )];

        let summary = summarize_graph_context(&graph, &docs, 2).unwrap();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|line| line.ends_with("None")));
    }

    #[test]
    fn test_neighbours_within_depth() {
        let graph = AdjacencyGraph::new(
            &["شورای آموزشی", "دانشکده", "دانشگاه", "وزارت علوم"],
            &[
                ("شورای آموزشی", "دانشکده"),
                ("دانشکده", "دانشگاه"),
                ("دانشگاه", "وزارت علوم"),
            ],
        );
        let docs = vec![doc("تصویب در شورای آموزشی")];

        let summary = summarize_graph_context(&graph, &docs, 2).unwrap();
        assert_eq!(
            summary,
            "- شورای آموزشی: related concepts: دانشکده, دانشگاه"
        );
    }

    #[test]
    fn test_no_match_is_none() {
        let graph = AdjacencyGraph::new(&["Senate"], &[]);
        assert!(summarize_graph_context(&graph, &[doc("unrelated")], 2).is_none());
    }

    #[test]
    fn test_matches_are_deduplicated_across_documents() {
        let labels = vec!["Alpha".to_string(), "Beta".to_string(), " ".to_string()];
        let docs = vec![doc("beta then alpha"), doc("ALPHA again"), doc("beta")];
        assert_eq!(match_entities(&labels, &docs), vec!["Alpha", "Beta"]);
    }
}
