//! The syntax tree arena
//!
//!     Nodes live in one flat `Vec` owned by [SyntaxTree] and refer to each other by [NodeId].
//!     A node's children are an ordered list of ids it owns exclusively; its parent is a plain
//!     id used for navigation only. Nothing outside the tree holds a node, only ids, so scopes
//!     and symbols can point back into the tree without ownership cycles.
//!
//!     Spans
//!
//!         Every node has an `offset` and a `length`. A node is created with zero length and
//!         grows as children are adopted ([SyntaxTree::adopt_child]), as the parser finishes
//!         it ([SyntaxTree::set_end]) and as issues are attached ([SyntaxTree::add_issue]).
//!         Growth is propagated to every ancestor, so a node's span always encloses the spans
//!         of its children and of its markers, whatever the order things were attached in.
//!
//!     Backtracking
//!
//!         The parser creates nodes speculatively. [SyntaxTree::mark] and
//!         [SyntaxTree::truncate] drop every node created after a mark. A rule only ever
//!         adopts nodes it created itself into nodes it created itself, so truncation never
//!         leaves a dangling child id behind.
//!
//!     After parsing the shape is frozen. Later passes read the tree and annotate nodes through
//!     the side table ([SyntaxTree::set_data]).

use super::diagnostics::Marker;
use super::kinds::NodeKind;
use super::range::{Position, SourceLocation};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Index of a node in its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Shared envelope of every node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub offset: usize,
    pub length: usize,
    #[serde(skip)]
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<Marker>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, Value>,
}

impl Node {
    fn new(kind: NodeKind, offset: usize) -> Self {
        Self {
            kind,
            offset,
            length: 0,
            parent: None,
            children: Vec::new(),
            issues: Vec::new(),
            data: BTreeMap::new(),
        }
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// True when `offset` falls inside the node, both ends included
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.offset <= offset && offset <= self.end()
    }
}

/// Checkpoint for speculative node creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeMark(usize);

/// A parsed scene: its source and the node arena
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: Arc<str>,
    location: SourceLocation,
    nodes: Vec<Node>,
}

impl SyntaxTree {
    pub fn new(source: Arc<str>) -> Self {
        let location = SourceLocation::new(&source);
        Self {
            source,
            location,
            nodes: Vec::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// The first node created, the Scene for parsed trees
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub(crate) fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// All node ids in creation order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    /// Source text covered by a node
    pub fn text(&self, id: NodeId) -> &str {
        let node = self.node(id);
        let end = node.end().min(self.source.len());
        self.source.get(node.offset.min(end)..end).unwrap_or("")
    }

    pub fn start_position(&self, id: NodeId) -> Position {
        self.location.byte_to_position(self.node(id).offset)
    }

    // ---- construction ----

    /// Create a detached node with zero length
    pub fn create(&mut self, kind: NodeKind, offset: usize) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::new(kind, offset));
        id
    }

    pub fn mark(&self) -> TreeMark {
        TreeMark(self.nodes.len())
    }

    /// Drop every node created after `mark`
    pub fn truncate(&mut self, mark: TreeMark) {
        self.nodes.truncate(mark.0);
    }

    /// Attach `child` to `parent`, at `index` or at the end, growing the parent's span
    pub fn adopt_child(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) {
        if let Some(previous) = self.nodes[child.index()].parent.take() {
            self.nodes[previous.index()].children.retain(|c| *c != child);
        }
        self.nodes[child.index()].parent = Some(parent);

        let children = &mut self.nodes[parent.index()].children;
        match index {
            Some(at) if at < children.len() => children.insert(at, child),
            _ => children.push(child),
        }

        let (offset, end) = {
            let node = self.node(child);
            (node.offset, node.end())
        };
        self.extend(parent, offset, end);
    }

    /// Grow a node so it ends no earlier than `end`
    pub fn set_end(&mut self, id: NodeId, end: usize) {
        let offset = self.node(id).offset;
        self.extend(id, offset, end);
    }

    /// Grow a node (and its ancestors) to cover `offset..end`
    fn extend(&mut self, id: NodeId, offset: usize, end: usize) {
        let mut current = Some(id);
        while let Some(at) = current {
            let node = &mut self.nodes[at.index()];
            let old_end = node.end();
            if offset >= node.offset && end <= old_end {
                break;
            }
            let new_offset = node.offset.min(offset);
            node.length = old_end.max(end) - new_offset;
            node.offset = new_offset;
            current = node.parent;
        }
    }

    // ---- issues ----

    /// Attach a marker, growing the node so the marker lies within it
    pub fn add_issue(&mut self, id: NodeId, marker: Marker) {
        self.extend(id, marker.offset(), marker.end());
        self.nodes[id.index()].issues.push(marker);
    }

    pub fn issues(&self, id: NodeId) -> &[Marker] {
        &self.node(id).issues
    }

    /// Markers of a whole subtree in pre-order
    pub fn collect_issues(&self, id: NodeId) -> Vec<&Marker> {
        let mut issues = Vec::new();
        self.accept(id, |tree, node| {
            issues.extend(tree.issues(node));
            true
        });
        issues
    }

    // ---- side table ----

    pub fn get_data(&self, id: NodeId, key: &str) -> Option<&Value> {
        self.node(id).data.get(key)
    }

    pub fn set_data(&mut self, id: NodeId, key: impl Into<String>, value: Value) {
        self.nodes[id.index()].data.insert(key.into(), value);
    }

    // ---- queries ----

    /// Child of `id` covering `offset`; with `go_deep`, the deepest such descendant
    pub fn find_child_at_offset(&self, id: NodeId, offset: usize, go_deep: bool) -> Option<NodeId> {
        let found = self
            .children(id)
            .iter()
            .rev()
            .copied()
            .find(|child| self.node(*child).contains_offset(offset))?;
        if go_deep {
            Some(self.find_child_at_offset(found, offset, true).unwrap_or(found))
        } else {
            Some(found)
        }
    }

    /// Chain of nodes from the root down to the deepest node covering `offset`
    pub fn node_path(&self, offset: usize) -> Vec<NodeId> {
        let mut path = Vec::new();
        if self.is_empty() {
            return path;
        }
        let mut current = self.root();
        path.push(current);
        while let Some(child) = self.find_child_at_offset(current, offset, false) {
            path.push(child);
            current = child;
        }
        path
    }

    /// Deepest node covering `offset`
    pub fn node_at_offset(&self, offset: usize) -> Option<NodeId> {
        self.node_path(offset).last().copied()
    }

    /// Nearest proper ancestor whose kind satisfies `predicate`
    pub fn find_parent(
        &self,
        id: NodeId,
        predicate: impl Fn(&NodeKind) -> bool,
    ) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(at) = current {
            if predicate(self.kind(at)) {
                return Some(at);
            }
            current = self.parent(at);
        }
        None
    }

    /// Whether `outer`'s span encloses `inner`'s span
    pub fn encloses(&self, outer: NodeId, inner: NodeId) -> bool {
        let (a, b) = (self.node(outer), self.node(inner));
        a.offset <= b.offset && b.end() <= a.end()
    }

    /// First direct child whose kind satisfies `predicate`
    pub fn find_child(
        &self,
        id: NodeId,
        predicate: impl Fn(&NodeKind) -> bool,
    ) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| predicate(self.kind(*child)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choicescript::ast::diagnostics::{Level, Rule};

    const RULE: Rule = Rule::new("test", "test marker");

    fn tree(source: &str) -> SyntaxTree {
        SyntaxTree::new(Arc::from(source))
    }

    #[test]
    fn test_adopt_child_extends_span() {
        let mut tree = tree("*set x 5");
        let root = tree.create(NodeKind::SetCommand { by_reference: false }, 0);
        let variable = tree.create(NodeKind::Variable, 5);
        tree.set_end(variable, 6);
        let value = tree.create(NodeKind::NumericValue, 7);
        tree.set_end(value, 8);

        // out of order adoption still yields the maximum extent
        tree.adopt_child(root, value, None);
        tree.adopt_child(root, variable, Some(0));

        assert_eq!(tree.node(root).length, 8);
        assert_eq!(tree.children(root), &[variable, value]);
        assert_eq!(tree.parent(value), Some(root));
        assert!(tree.encloses(root, value));
        assert_eq!(tree.text(variable), "x");
    }

    #[test]
    fn test_growth_propagates_to_ancestors() {
        let mut tree = tree("abcdefghij");
        let root = tree.create(NodeKind::TextLine, 0);
        let child = tree.create(NodeKind::RealWord, 2);
        tree.adopt_child(root, child, None);
        tree.set_end(child, 9);
        assert_eq!(tree.node(root).end(), 9);
    }

    #[test]
    fn test_add_issue_extends_node() {
        let mut tree = tree("*label   ");
        let node = tree.create(NodeKind::LabelDeclaration, 0);
        tree.set_end(node, 6);
        tree.add_issue(node, Marker::new(node, 7, 2, RULE, Level::Error));
        assert_eq!(tree.node(node).end(), 9);
        assert_eq!(tree.collect_issues(node).len(), 1);
    }

    #[test]
    fn test_truncate_drops_speculative_nodes() {
        let mut tree = tree("x");
        let root = tree.create(NodeKind::TextLine, 0);
        let mark = tree.mark();
        tree.create(NodeKind::RealWord, 0);
        tree.truncate(mark);
        assert_eq!(tree.len(), 1);
        assert!(tree.children(root).is_empty());
    }

    #[test]
    fn test_offset_queries() {
        let mut tree = tree("*goto end");
        let scene = tree.create(NodeKind::Scene { name: None, uri: None }, 0);
        let command = tree.create(NodeKind::FlowCommand { name: "goto".into() }, 0);
        let label_ref = tree.create(NodeKind::LabelRef, 6);
        let label = tree.create(NodeKind::Label, 6);
        tree.set_end(label, 9);
        tree.adopt_child(label_ref, label, None);
        tree.adopt_child(command, label_ref, None);
        tree.adopt_child(scene, command, None);

        assert_eq!(tree.node_at_offset(7), Some(label));
        assert_eq!(tree.node_path(7), vec![scene, command, label_ref, label]);
        assert_eq!(tree.find_child_at_offset(scene, 7, true), Some(label));
        assert_eq!(
            tree.find_parent(label, |kind| matches!(kind, NodeKind::FlowCommand { .. })),
            Some(command)
        );
        assert_eq!(tree.node_at_offset(2), Some(command));
    }

    #[test]
    fn test_side_table() {
        let mut tree = tree("x");
        let node = tree.create(NodeKind::Variable, 0);
        tree.set_data(node, "scope", Value::from(3));
        assert_eq!(tree.get_data(node, "scope"), Some(&Value::from(3)));
        assert_eq!(tree.get_data(node, "missing"), None);
    }
}
