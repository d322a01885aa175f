//! Markers and diagnostics
//!
//! ## Problem
//!
//! Parsing must never stop at the first problem. A malformed line still produces a node, and
//! the problem has to travel with that node so tooling can report it later.
//!
//! ## Solution
//!
//! - [`Rule`]: a stable id plus a message template, one per kind of problem
//! - [`Marker`]: a rule applied to a node at an offset/length, with a level and a final message
//! - [`Diagnostic`]: a marker projected to line:column positions for editor protocols
//!
//! Markers are attached to the node where the problem was detected and gathered with
//! `SyntaxTree::collect_issues`. The tree guarantees a marker's range lies within its
//! owning node's span.

use super::node::NodeId;
use super::range::{Position, SourceLocation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity levels matching the editor protocol, plus `Ignore` for disabled rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Ignore,
    Error,
    Warning,
    Information,
    Hint,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Ignore => write!(f, "ignore"),
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Information => write!(f, "info"),
            Level::Hint => write!(f, "hint"),
        }
    }
}

/// A kind of problem: stable id and message template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rule {
    pub id: &'static str,
    pub message: &'static str,
}

impl Rule {
    pub const fn new(id: &'static str, message: &'static str) -> Self {
        Self { id, message }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// A problem attached to a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
    rule: Rule,
    level: Level,
    node: NodeId,
    offset: usize,
    length: usize,
    message: String,
}

impl Marker {
    pub fn new(node: NodeId, offset: usize, length: usize, rule: Rule, level: Level) -> Self {
        Self {
            rule,
            level,
            node,
            offset,
            length,
            message: rule.message.to_string(),
        }
    }

    /// Replace the template message with a specific one
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn rule(&self) -> Rule {
        self.rule
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Project onto line:column positions
    pub fn to_diagnostic(&self, location: &SourceLocation) -> Diagnostic {
        Diagnostic {
            start: location.byte_to_position(self.offset),
            end: location.byte_to_position(self.end()),
            level: self.level,
            code: self.rule.id.to_string(),
            message: self.message.clone(),
        }
    }
}

/// Structured diagnostic for protocol layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub start: Position,
    pub end: Position,
    pub level: Level,
    pub code: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: {} at {}",
            self.level, self.code, self.message, self.start
        )
    }
}
