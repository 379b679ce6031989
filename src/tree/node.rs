use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Key of a node in a [`DecisionGraph`](crate::tree::DecisionGraph).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a help article handed to whatever resolves articles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ArticleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ArticleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where choosing an option leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Move to another question.
    ContinueTo(NodeId),
    /// Terminal: surface a help article. The session stays where it is.
    ResolveArticle(ArticleId),
}

/// One selectable answer of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Text shown to the operator. Never interpreted.
    pub label: String,
    /// Explicit shortcut. When `None` the positional digit is used.
    pub hotkey: Option<char>,
    pub outcome: Outcome,
}

impl Choice {
    pub fn continue_to(label: impl Into<String>, next: impl Into<NodeId>) -> Self {
        Self {
            label: label.into(),
            hotkey: None,
            outcome: Outcome::ContinueTo(next.into()),
        }
    }

    pub fn article(label: impl Into<String>, article: impl Into<ArticleId>) -> Self {
        Self {
            label: label.into(),
            hotkey: None,
            outcome: Outcome::ResolveArticle(article.into()),
        }
    }

    pub fn with_hotkey(mut self, hotkey: char) -> Self {
        self.hotkey = Some(hotkey);
        self
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.outcome, Outcome::ResolveArticle(_))
    }
}

/// Digit shortcut for the option at `index`: '1' through '9', nothing past that.
pub fn positional_hotkey(index: usize) -> Option<char> {
    u32::try_from(index + 1)
        .ok()
        .and_then(|digit| char::from_digit(digit, 10))
}

/// A single question in the troubleshooting tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Unique identifier for this node (e.g. "start", "power-issue").
    pub id: NodeId,
    /// What the operator asks the customer.
    pub prompt: String,
    /// Operator-only note, may be empty.
    pub guidance: String,
    pub options: Vec<Choice>,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            guidance: String::new(),
            options: Vec::new(),
        }
    }

    pub fn with_guidance(mut self, guidance: impl Into<String>) -> Self {
        self.guidance = guidance.into();
        self
    }

    pub fn with_option(mut self, choice: Choice) -> Self {
        self.options.push(choice);
        self
    }

    /// Hotkey the option at `index` answers to, explicit or positional.
    pub fn resolved_hotkey(&self, index: usize) -> Option<char> {
        let choice = self.options.get(index)?;
        choice.hotkey.or_else(|| positional_hotkey(index))
    }

    /// Index of the option bound to `key`, if any.
    pub fn hotkey_index(&self, key: char) -> Option<usize> {
        (0..self.options.len()).find(|&index| self.resolved_hotkey(index) == Some(key))
    }
}
