//! Tree traversal
//!
//! Traversal is pre-order and runs on an explicit stack, so deeply nested scenes cannot
//! exhaust the call stack. A visitor returns `false` from [Visitor::visit_node] to skip the
//! subtree below the node it was given; [Visitor::leave_node] is called once the subtree of a
//! visited node is done (whether or not it was pruned).

use super::node::{NodeId, SyntaxTree};

/// Visitor trait for walking a [SyntaxTree]
pub trait Visitor {
    /// Called before the children of `node`. Return `false` to prune the subtree.
    fn visit_node(&mut self, tree: &SyntaxTree, node: NodeId) -> bool;

    fn leave_node(&mut self, _tree: &SyntaxTree, _node: NodeId) {}
}

enum Step {
    Enter(NodeId),
    Leave(NodeId),
}

impl SyntaxTree {
    /// Walk the subtree at `start` with a callback deciding whether to descend
    pub fn accept<'a>(&'a self, start: NodeId, mut visit: impl FnMut(&'a SyntaxTree, NodeId) -> bool) {
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if visit(self, node) {
                stack.extend(self.children(node).iter().rev().copied());
            }
        }
    }

    /// Walk the subtree at `start` with a [Visitor]
    pub fn accept_visitor(&self, start: NodeId, visitor: &mut dyn Visitor) {
        let mut stack = vec![Step::Enter(start)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(node) => {
                    let descend = visitor.visit_node(self, node);
                    stack.push(Step::Leave(node));
                    if descend {
                        stack.extend(self.children(node).iter().rev().map(|c| Step::Enter(*c)));
                    }
                }
                Step::Leave(node) => visitor.leave_node(self, node),
            }
        }
    }
}
