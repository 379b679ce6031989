pub mod node;
pub mod scenario;

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

pub use node::{positional_hotkey, ArticleId, Choice, Node, NodeId, Outcome};

/// Node expansions `longest_acyclic_path` may spend before giving up.
const PATH_SEARCH_BUDGET: usize = 100_000;

/// Reasons a graph is refused at load time.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("start node '{0}' is not in the graph")]
    MissingStart(NodeId),

    #[error("node '{0}' is defined more than once")]
    DuplicateNode(NodeId),

    #[error("node '{0}' has no options")]
    EmptyOptions(NodeId),

    #[error("option {option} of node '{node}' continues to unknown node '{target}'")]
    UnresolvedNodeReference {
        node: NodeId,
        option: usize,
        target: NodeId,
    },

    #[error("hotkey '{hotkey}' is bound to more than one option of node '{node}'")]
    DuplicateHotkey { node: NodeId, hotkey: char },

    #[error("option {option} of node '{node}' has neither 'next' nor 'article'")]
    MissingOutcome { node: NodeId, option: usize },

    #[error("option {option} of node '{node}' has both 'next' and 'article'")]
    AmbiguousOutcome { node: NodeId, option: usize },

    #[error("malformed graph definition: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The full troubleshooting tree: a validated map of node-id -> Node.
///
/// Immutable once built. Wrap it in an `Arc` to share it between sessions.
#[derive(Debug, Clone)]
pub struct DecisionGraph {
    nodes: HashMap<NodeId, Node>,
    start_node_id: NodeId,
}

impl DecisionGraph {
    /// Build a graph, rejecting anything a session could trip over later.
    pub fn new(start_node_id: impl Into<NodeId>, nodes: Vec<Node>) -> Result<Self, GraphError> {
        let start_node_id = start_node_id.into();

        let mut order = Vec::with_capacity(nodes.len());
        let mut map = HashMap::with_capacity(nodes.len());
        for node in nodes {
            if map.contains_key(&node.id) {
                return Err(GraphError::DuplicateNode(node.id));
            }
            order.push(node.id.clone());
            map.insert(node.id.clone(), node);
        }

        if !map.contains_key(&start_node_id) {
            return Err(GraphError::MissingStart(start_node_id));
        }

        // Walk in definition order so the first error reported is stable.
        for id in &order {
            validate_node(&map[id], &map)?;
        }

        let graph = Self {
            nodes: map,
            start_node_id,
        };

        let reachable = graph.reachable_from_start();
        let mut orphans: Vec<&NodeId> = order.iter().filter(|id| !reachable.contains(id)).collect();
        orphans.sort();
        for id in orphans {
            warn!("Node '{id}' cannot be reached from '{}'", graph.start_node_id);
        }
        debug!(
            "Loaded decision graph: {} nodes, start '{}'",
            graph.nodes.len(),
            graph.start_node_id
        );

        Ok(graph)
    }

    /// Parse the JSON graph format and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, GraphError> {
        let raw: RawGraph = serde_json::from_str(json)?;
        raw.into_graph()
    }

    pub fn from_path(path: &Path) -> Result<Self, GraphError> {
        let json = std::fs::read_to_string(path).map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn start_node_id(&self) -> &NodeId {
        &self.start_node_id
    }

    pub fn start_node(&self) -> &Node {
        self.nodes
            .get(&self.start_node_id)
            .expect("start node is checked in DecisionGraph::new")
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of every node some path from the start node reaches, start included.
    pub fn reachable_from_start(&self) -> BTreeSet<&NodeId> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([&self.start_node_id]);

        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            for choice in &node.options {
                if let Outcome::ContinueTo(next) = &choice.outcome {
                    queue.push_back(next);
                }
            }
        }

        seen
    }

    /// Count the nodes on the longest path from the start that never revisits
    /// a node, i.e. the most questions an operator can be asked before
    /// either looping or hitting an article.
    ///
    /// The search is exhaustive, so it gives up after a fixed number of node
    /// expansions and returns `None` for graphs too tangled to measure.
    pub fn longest_acyclic_path(&self) -> Option<usize> {
        let mut on_path = HashSet::new();
        let mut budget = PATH_SEARCH_BUDGET;
        let longest = self.longest_path_from(&self.start_node_id, &mut on_path, &mut budget);
        if longest.is_none() {
            debug!("Longest path search gave up after {PATH_SEARCH_BUDGET} expansions");
        }
        longest
    }

    fn longest_path_from<'a>(
        &'a self,
        node_id: &'a NodeId,
        on_path: &mut HashSet<&'a NodeId>,
        budget: &mut usize,
    ) -> Option<usize> {
        let Some(node) = self.nodes.get(node_id) else {
            return Some(0);
        };
        if on_path.contains(node_id) {
            return Some(0);
        }
        *budget = budget.checked_sub(1)?;
        on_path.insert(node_id);

        let mut max_child = 0;
        for choice in &node.options {
            if let Outcome::ContinueTo(next) = &choice.outcome {
                max_child = max_child.max(self.longest_path_from(next, on_path, budget)?);
            }
        }

        on_path.remove(node_id);
        Some(1 + max_child)
    }
}

fn validate_node(node: &Node, nodes: &HashMap<NodeId, Node>) -> Result<(), GraphError> {
    if node.options.is_empty() {
        return Err(GraphError::EmptyOptions(node.id.clone()));
    }

    let mut hotkeys = HashSet::new();
    for (index, choice) in node.options.iter().enumerate() {
        if let Outcome::ContinueTo(target) = &choice.outcome {
            if !nodes.contains_key(target) {
                return Err(GraphError::UnresolvedNodeReference {
                    node: node.id.clone(),
                    option: index,
                    target: target.clone(),
                });
            }
        }
        if let Some(hotkey) = node.resolved_hotkey(index) {
            if !hotkeys.insert(hotkey) {
                return Err(GraphError::DuplicateHotkey {
                    node: node.id.clone(),
                    hotkey,
                });
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// On-disk format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawGraph {
    start: NodeId,
    nodes: Vec<RawNode>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    id: NodeId,
    question: String,
    #[serde(default)]
    guidance: String,
    #[serde(default)]
    options: Vec<RawOption>,
}

#[derive(Debug, Deserialize)]
struct RawOption {
    text: String,
    #[serde(default)]
    next: Option<NodeId>,
    #[serde(default)]
    article: Option<ArticleId>,
    #[serde(default)]
    hotkey: Option<char>,
}

impl RawGraph {
    fn into_graph(self) -> Result<DecisionGraph, GraphError> {
        let nodes = self
            .nodes
            .into_iter()
            .map(RawNode::into_node)
            .collect::<Result<Vec<_>, _>>()?;
        DecisionGraph::new(self.start, nodes)
    }
}

impl RawNode {
    fn into_node(self) -> Result<Node, GraphError> {
        let id = self.id;
        let options = self
            .options
            .into_iter()
            .enumerate()
            .map(|(option, raw)| {
                let outcome = match (raw.next, raw.article) {
                    (Some(next), None) => Outcome::ContinueTo(next),
                    (None, Some(article)) => Outcome::ResolveArticle(article),
                    (None, None) => {
                        return Err(GraphError::MissingOutcome {
                            node: id.clone(),
                            option,
                        })
                    }
                    (Some(_), Some(_)) => {
                        return Err(GraphError::AmbiguousOutcome {
                            node: id.clone(),
                            option,
                        })
                    }
                };
                Ok(Choice {
                    label: raw.text,
                    hotkey: raw.hotkey,
                    outcome,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Node {
            id,
            prompt: self.question,
            guidance: self.guidance,
            options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_node_graph() -> Vec<Node> {
        vec![
            Node::new("start", "Does it turn on?")
                .with_option(Choice::continue_to("Yes", "on"))
                .with_option(Choice::article("No", "power-guide")),
            Node::new("on", "Is there a picture?").with_option(Choice::article("No", "no-picture")),
        ]
    }

    #[test]
    fn builds_valid_graph() {
        let graph = DecisionGraph::new("start", two_node_graph()).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.start_node().id, NodeId::from("start"));
        assert!(graph.get("on").is_some());
        assert!(graph.get("missing").is_none());
    }

    #[test]
    fn rejects_missing_start() {
        let err = DecisionGraph::new("nope", two_node_graph()).unwrap_err();
        assert!(matches!(err, GraphError::MissingStart(id) if id.as_str() == "nope"));
    }

    #[test]
    fn rejects_duplicate_node() {
        let mut nodes = two_node_graph();
        nodes.push(Node::new("on", "again").with_option(Choice::article("x", "x")));
        let err = DecisionGraph::new("start", nodes).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateNode(id) if id.as_str() == "on"));
    }

    #[test]
    fn rejects_node_without_options() {
        let mut nodes = two_node_graph();
        nodes.push(Node::new("dead-end", "Hmm?"));
        let err = DecisionGraph::new("start", nodes).unwrap_err();
        assert!(matches!(err, GraphError::EmptyOptions(id) if id.as_str() == "dead-end"));
    }

    #[test]
    fn rejects_dangling_continue_to() {
        let nodes = vec![Node::new("start", "?").with_option(Choice::continue_to("Go", "elsewhere"))];
        let err = DecisionGraph::new("start", nodes).unwrap_err();
        match err {
            GraphError::UnresolvedNodeReference { node, option, target } => {
                assert_eq!(node.as_str(), "start");
                assert_eq!(option, 0);
                assert_eq!(target.as_str(), "elsewhere");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rejects_explicit_hotkey_clashing_with_position() {
        let nodes = vec![Node::new("start", "?")
            .with_option(Choice::article("A", "a").with_hotkey('2'))
            .with_option(Choice::article("B", "b"))];
        let err = DecisionGraph::new("start", nodes).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateHotkey { hotkey: '2', .. }));
    }

    #[test]
    fn cycles_are_allowed() {
        let nodes = vec![
            Node::new("a", "A?").with_option(Choice::continue_to("to b", "b")),
            Node::new("b", "B?")
                .with_option(Choice::continue_to("to a", "a"))
                .with_option(Choice::article("done", "done")),
        ];
        let graph = DecisionGraph::new("a", nodes).unwrap();
        assert_eq!(graph.longest_acyclic_path(), Some(2));
        assert_eq!(graph.reachable_from_start().len(), 2);
    }

    #[test]
    fn longest_path_gives_up_on_dense_loops() {
        // Every node continues to the next five, wrapping around to the start.
        let count = 30;
        let nodes = (0..count)
            .map(|i| {
                (1..=5).fold(Node::new(format!("n{i}"), "?"), |node, hop| {
                    node.with_option(Choice::continue_to("next", format!("n{}", (i + hop) % count)))
                })
            })
            .collect();
        let graph = DecisionGraph::new("n0", nodes).unwrap();
        assert_eq!(graph.longest_acyclic_path(), None);
        assert_eq!(graph.reachable_from_start().len(), count);
    }

    #[test]
    fn orphans_are_not_reachable() {
        let mut nodes = two_node_graph();
        nodes.push(Node::new("orphan", "?").with_option(Choice::article("x", "x")));
        let graph = DecisionGraph::new("start", nodes).unwrap();
        let reachable = graph.reachable_from_start();
        assert!(reachable.contains(&NodeId::from("on")));
        assert!(!reachable.contains(&NodeId::from("orphan")));
    }

    #[test]
    fn parses_json_format() {
        let json = r#"{
            "start": "start",
            "nodes": [
                {
                    "id": "start",
                    "question": "Does it turn on?",
                    "guidance": "Wait for a clear answer",
                    "options": [
                        { "text": "Yes", "next": "on", "hotkey": "y" },
                        { "text": "No", "article": "power-guide" }
                    ]
                },
                {
                    "id": "on",
                    "question": "Is there a picture?",
                    "options": [ { "text": "No", "article": "no-picture" } ]
                }
            ]
        }"#;
        let graph = DecisionGraph::from_json_str(json).unwrap();
        let start = graph.start_node();
        assert_eq!(start.guidance, "Wait for a clear answer");
        assert_eq!(start.options[0].hotkey, Some('y'));
        assert_eq!(start.options[0].outcome, Outcome::ContinueTo("on".into()));
        assert_eq!(start.options[1].outcome, Outcome::ResolveArticle("power-guide".into()));
        assert_eq!(graph.get("on").unwrap().guidance, "");
    }

    #[test]
    fn json_option_needs_exactly_one_outcome() {
        let neither = r#"{"start":"s","nodes":[{"id":"s","question":"?","options":[{"text":"x"}]}]}"#;
        assert!(matches!(
            DecisionGraph::from_json_str(neither),
            Err(GraphError::MissingOutcome { option: 0, .. })
        ));

        let both = r#"{"start":"s","nodes":[{"id":"s","question":"?",
            "options":[{"text":"x","next":"s","article":"a"}]}]}"#;
        assert!(matches!(
            DecisionGraph::from_json_str(both),
            Err(GraphError::AmbiguousOutcome { option: 0, .. })
        ));
    }

    #[test]
    fn json_hotkey_must_be_one_character() {
        let json = r#"{"start":"s","nodes":[{"id":"s","question":"?",
            "options":[{"text":"x","article":"a","hotkey":"12"}]}]}"#;
        assert!(matches!(DecisionGraph::from_json_str(json), Err(GraphError::Parse(_))));
    }
}
