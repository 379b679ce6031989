use std::sync::Arc;

use log::{debug, info};
use serde::Serialize;
use thiserror::Error;

use crate::tree::{ArticleId, DecisionGraph, Node, NodeId, Outcome};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// A node the operator has left, with the step number shown while on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub node_id: NodeId,
    pub step_index: usize,
}

/// Mutable state of one troubleshooting interaction.
///
/// Only [`NavigationEngine`] mutates it; a reset replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    current_node_id: NodeId,
    /// LIFO stack of path occurrences. The same node may appear more than
    /// once when the graph loops.
    history: Vec<HistoryEntry>,
    /// 1-based position on the current path.
    step_index: usize,
}

impl Session {
    fn start(graph: &DecisionGraph) -> Self {
        Self {
            current_node_id: graph.start_node_id().clone(),
            history: Vec::new(),
            step_index: 1,
        }
    }

    pub fn current_node_id(&self) -> &NodeId {
        &self.current_node_id
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }
}

// ---------------------------------------------------------------------------
// Engine output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub label: String,
    pub hotkey: Option<char>,
    /// Choosing it surfaces an article instead of another question.
    pub terminal: bool,
}

/// Everything a presenter needs to draw the current question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub node_id: NodeId,
    pub prompt: String,
    pub guidance: String,
    pub options: Vec<OptionView>,
    pub step_index: usize,
    pub can_go_back: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Transition {
    /// The session now sits on this node.
    Advanced(NodeId),
    /// A terminal option was chosen. The session did not move.
    ArticleRequested(ArticleId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    #[error("option {index} does not exist, the current question has {available}")]
    InvalidSelection { index: usize, available: usize },

    #[error("no hotkey '{0}' on the current question")]
    UnknownHotkey(char),

    #[error("already at the first question")]
    NoHistory,
}

// ---------------------------------------------------------------------------
// Navigation engine
// ---------------------------------------------------------------------------

/// Walks a [`DecisionGraph`] one choice at a time.
///
/// One engine owns one session. The graph is shared so a host can run many
/// engines over the same tree; the engine itself expects a single writer.
#[derive(Debug, Clone)]
pub struct NavigationEngine {
    graph: Arc<DecisionGraph>,
    session: Session,
}

impl NavigationEngine {
    pub fn new(graph: Arc<DecisionGraph>) -> Self {
        let session = Session::start(&graph);
        info!("Session started at node: {}", session.current_node_id);
        Self { graph, session }
    }

    pub fn graph(&self) -> &DecisionGraph {
        &self.graph
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn current_node(&self) -> &Node {
        self.graph
            .get(self.session.current_node_id.as_str())
            .expect("session only ever points at nodes of its own graph")
    }

    pub fn current_view(&self) -> ViewState {
        let node = self.current_node();
        let options = node
            .options
            .iter()
            .enumerate()
            .map(|(index, choice)| OptionView {
                label: choice.label.clone(),
                hotkey: node.resolved_hotkey(index),
                terminal: choice.is_terminal(),
            })
            .collect();

        ViewState {
            node_id: node.id.clone(),
            prompt: node.prompt.clone(),
            guidance: node.guidance.clone(),
            options,
            step_index: self.session.step_index,
            can_go_back: !self.session.history.is_empty(),
        }
    }

    /// Take option `index` of the current question.
    ///
    /// History grows and the step counter advances even when the option is
    /// terminal, so a later `go_back` undoes article selections too.
    pub fn select_option(&mut self, index: usize) -> Result<Transition, NavError> {
        let node = self.current_node();
        let choice = node.options.get(index).ok_or(NavError::InvalidSelection {
            index,
            available: node.options.len(),
        })?;
        let outcome = choice.outcome.clone();

        let from = self.session.current_node_id.clone();
        self.session.history.push(HistoryEntry {
            node_id: from.clone(),
            step_index: self.session.step_index,
        });
        self.session.step_index += 1;

        match outcome {
            Outcome::ContinueTo(next) => {
                info!(
                    "Transition: {} -> {} (step {})",
                    from, next, self.session.step_index
                );
                self.session.current_node_id = next.clone();
                Ok(Transition::Advanced(next))
            }
            Outcome::ResolveArticle(article) => {
                info!(
                    "Article requested at {}: {} (step {})",
                    from, article, self.session.step_index
                );
                Ok(Transition::ArticleRequested(article))
            }
        }
    }

    /// Take the option bound to `key` on the current question.
    pub fn select_hotkey(&mut self, key: char) -> Result<Transition, NavError> {
        let index = self
            .current_node()
            .hotkey_index(key)
            .ok_or(NavError::UnknownHotkey(key))?;
        self.select_option(index)
    }

    /// Undo the most recent selection, restoring its node and step exactly.
    pub fn go_back(&mut self) -> Result<Transition, NavError> {
        let entry = self.session.history.pop().ok_or(NavError::NoHistory)?;
        info!(
            "Back: {} -> {} (step {})",
            self.session.current_node_id, entry.node_id, entry.step_index
        );
        self.session.current_node_id = entry.node_id;
        self.session.step_index = entry.step_index;
        Ok(Transition::Advanced(self.session.current_node_id.clone()))
    }

    pub fn reset(&mut self) -> ViewState {
        self.session = Session::start(&self.graph);
        info!("Session reset to node: {}", self.session.current_node_id);
        self.current_view()
    }

    pub fn repeat_current(&self) -> ViewState {
        debug!("Repeat requested at node: {}", self.session.current_node_id);
        self.current_view()
    }
}
