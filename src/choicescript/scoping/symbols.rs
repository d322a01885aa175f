//! Symbol queries
//!
//! [Symbols] answers name lookups over one scene's [ScopeTree]. Lookups start at the scope
//! enclosing an offset and walk outwards to the root, so the innermost binding wins. A
//! variable is only found at or after its declaration. Labels are jump targets: one that no
//! enclosing scope binds still resolves to a label declared anywhere in the scene.

use super::scope::{ReferenceType, ScopeTree, Symbol};
use crate::choicescript::ast::{NodeId, NodeKind, SyntaxTree};
use std::collections::HashSet;

/// Read-only lookup facade over a scene's tree and scopes
#[derive(Debug, Clone, Copy)]
pub struct Symbols<'a> {
    tree: &'a SyntaxTree,
    scopes: &'a ScopeTree,
}

impl<'a> Symbols<'a> {
    pub fn new(tree: &'a SyntaxTree, scopes: &'a ScopeTree) -> Self {
        Self { tree, scopes }
    }

    pub fn scopes(&self) -> &'a ScopeTree {
        self.scopes
    }

    pub fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }

    /// Innermost binding of `name` visible at `offset`
    pub fn find_symbol(
        &self,
        name: &str,
        reference_type: ReferenceType,
        offset: usize,
    ) -> Option<&'a Symbol> {
        let mut scope = Some(self.scopes.find_scope(offset, 0));
        while let Some(current) = scope {
            if let Some(symbol) = self
                .scopes
                .find_in_scope(current, name, reference_type, offset)
            {
                return Some(symbol);
            }
            scope = self.scopes.parent(current);
        }
        if reference_type == ReferenceType::Label {
            return self
                .scopes
                .all_symbols()
                .map(|(_, symbol)| symbol)
                .find(|symbol| symbol.reference_type == ReferenceType::Label && symbol.name == name);
        }
        None
    }

    /// Resolve an identifier-like node. Labels qualified by a scene reference live in another
    /// scene and never resolve here.
    pub fn find_symbol_from_node(&self, node: NodeId) -> Option<&'a Symbol> {
        let reference_type = reference_type_of(self.tree, node);
        if reference_type == ReferenceType::Unknown || is_foreign_label(self.tree, node) {
            return None;
        }
        let name = self.tree.text(node);
        self.find_symbol(name, reference_type, self.tree.node(node).offset)
    }

    /// Whether `node` refers to the same binding as `symbol`
    pub fn matches_symbol(&self, node: NodeId, symbol: &Symbol) -> bool {
        if reference_type_of(self.tree, node) != symbol.reference_type
            || self.tree.text(node) != symbol.name
        {
            return false;
        }
        self.find_symbol_from_node(node)
            .is_some_and(|found| std::ptr::eq(found, symbol))
    }

    /// Every node in the scene that refers to `symbol`, declaration included
    pub fn references(&self, symbol: &Symbol) -> Vec<NodeId> {
        self.tree
            .ids()
            .filter(|id| self.matches_symbol(*id, symbol))
            .collect()
    }

    /// Symbols visible at `offset`, innermost first, one per name
    pub fn visible_symbols(
        &self,
        offset: usize,
        reference_type: Option<ReferenceType>,
    ) -> Vec<&'a Symbol> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        let mut scope = Some(self.scopes.find_scope(offset, 0));
        while let Some(current) = scope {
            for symbol in self.scopes.symbols(current).iter().rev() {
                if reference_type.is_some_and(|wanted| wanted != symbol.reference_type) {
                    continue;
                }
                if symbol.is_visible_at(offset)
                    && seen.insert((symbol.name.clone(), symbol.reference_type))
                {
                    found.push(symbol);
                }
            }
            scope = self.scopes.parent(current);
        }
        found
    }
}

/// Reference type a node denotes from its context
pub fn reference_type_of(tree: &SyntaxTree, node: NodeId) -> ReferenceType {
    match tree.kind(node) {
        NodeKind::Label => ReferenceType::Label,
        NodeKind::Variable => ReferenceType::Variable,
        _ => ReferenceType::Unknown,
    }
}

fn is_foreign_label(tree: &SyntaxTree, node: NodeId) -> bool {
    *tree.kind(node) == NodeKind::Label
        && tree
            .parent(node)
            .filter(|parent| *tree.kind(*parent) == NodeKind::LabelRef)
            .and_then(|parent| tree.find_child(parent, |kind| *kind == NodeKind::SceneRef))
            .is_some()
}
