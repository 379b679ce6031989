//! Operator-facing troubleshooting decision tree.
//!
//! [`tree`] holds the static question graph, [`engine`] walks it one choice
//! at a time with a reversible history, and [`console`] is a terminal
//! presenter for the engine.

pub mod console;
pub mod engine;
pub mod tree;

pub use engine::{HistoryEntry, NavError, NavigationEngine, Session, Transition, ViewState};
pub use tree::{ArticleId, Choice, DecisionGraph, GraphError, Node, NodeId, Outcome};
