//! Scopes and symbols
//!
//! A [ScopeTree] is an arena of lexical scopes for one scene. The root scope starts at offset
//! 0 and has no upper bound; every other scope covers the span of the construct that opened
//! it. A scope's range encloses its children's ranges and siblings never overlap, so the
//! scope for any offset is found by descending from the root.

use crate::choicescript::ast::{CsType, DeclarationKind, NodeId};
use serde::Serialize;
use std::fmt;

/// Index of a scope in its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ScopeId(u32);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// What a symbol names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReferenceType {
    Variable,
    Label,
    Unknown,
}

/// A binding declared in a scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    pub name: String,
    /// Source text of the initial value, if any
    pub value: Option<String>,
    pub reference_type: ReferenceType,
    /// The declaring node
    pub node: NodeId,
    /// Offset of the declaring node; variables are visible from here on
    pub offset: usize,
    pub value_type: CsType,
    /// `Some` for variables: temp or create
    pub declaration: Option<DeclarationKind>,
}

impl Symbol {
    pub fn is_persistent(&self) -> bool {
        self.declaration == Some(DeclarationKind::Create)
    }

    /// Whether the symbol can be referenced at `offset`. Labels are jump targets and are
    /// visible before their declaration.
    pub fn is_visible_at(&self, offset: usize) -> bool {
        self.reference_type == ReferenceType::Label || offset >= self.offset
    }
}

/// One lexical scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scope {
    pub offset: usize,
    pub length: usize,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub symbols: Vec<Symbol>,
}

impl Scope {
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.length)
    }

    /// Whether `offset..offset + length` lies within this scope
    pub fn contains(&self, offset: usize, length: usize) -> bool {
        self.offset <= offset && offset < self.end() && offset.saturating_add(length) <= self.end()
    }
}

/// The scopes of one scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                offset: 0,
                length: usize::MAX,
                parent: None,
                children: Vec::new(),
                symbols: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn ids(&self) -> impl Iterator<Item = ScopeId> + '_ {
        (0..self.scopes.len()).map(|index| ScopeId(index as u32))
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.scope(id).parent
    }

    pub fn symbols(&self, id: ScopeId) -> &[Symbol] {
        &self.scope(id).symbols
    }

    /// All symbols of every scope, in scope creation order
    pub fn all_symbols(&self) -> impl Iterator<Item = (ScopeId, &Symbol)> + '_ {
        self.ids()
            .flat_map(move |id| self.symbols(id).iter().map(move |symbol| (id, symbol)))
    }

    /// Open a child scope, kept sorted among its siblings by offset
    pub fn add_child(&mut self, parent: ScopeId, offset: usize, length: usize) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            offset,
            length,
            parent: Some(parent),
            children: Vec::new(),
            symbols: Vec::new(),
        });
        let at = {
            let siblings = &self.scopes[parent.index()].children;
            siblings.partition_point(|sibling| self.scopes[sibling.index()].offset <= offset)
        };
        self.scopes[parent.index()].children.insert(at, id);
        id
    }

    pub fn add_symbol(&mut self, scope: ScopeId, symbol: Symbol) {
        self.scopes[scope.index()].symbols.push(symbol);
    }

    /// Innermost scope containing `offset..offset + length`
    pub fn find_scope(&self, offset: usize, length: usize) -> ScopeId {
        let mut current = self.root();
        loop {
            let scope = self.scope(current);
            let candidate = scope
                .children
                .partition_point(|child| self.scope(*child).offset <= offset);
            match candidate
                .checked_sub(1)
                .map(|index| scope.children[index])
                .filter(|child| self.scope(*child).contains(offset, length))
            {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    /// Last symbol in `scope` with this name and type visible at `offset`
    pub fn find_in_scope(
        &self,
        scope: ScopeId,
        name: &str,
        reference_type: ReferenceType,
        offset: usize,
    ) -> Option<&Symbol> {
        self.symbols(scope).iter().rev().find(|symbol| {
            symbol.name == name
                && symbol.reference_type == reference_type
                && symbol.is_visible_at(offset)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(name: &str, offset: usize, reference_type: ReferenceType) -> Symbol {
        Symbol {
            name: name.to_string(),
            value: None,
            reference_type,
            node: NodeId::new(0),
            offset,
            value_type: CsType::Unknown,
            declaration: None,
        }
    }

    #[test]
    fn test_find_scope_descends() {
        let mut scopes = ScopeTree::new();
        let root = scopes.root();
        let second = scopes.add_child(root, 50, 20);
        let first = scopes.add_child(root, 10, 20);
        let nested = scopes.add_child(first, 15, 5);

        assert_eq!(scopes.scope(root).children, vec![first, second]);
        assert_eq!(scopes.find_scope(16, 0), nested);
        assert_eq!(scopes.find_scope(25, 0), first);
        assert_eq!(scopes.find_scope(55, 2), second);
        assert_eq!(scopes.find_scope(40, 0), root);
        assert_eq!(scopes.find_scope(usize::MAX - 1, 0), root);
        // a range crossing a boundary belongs to the enclosing scope
        assert_eq!(scopes.find_scope(28, 10), root);
    }

    #[test]
    fn test_visibility() {
        let mut scopes = ScopeTree::new();
        let root = scopes.root();
        scopes.add_symbol(root, symbol("x", 10, ReferenceType::Variable));
        scopes.add_symbol(root, symbol("end", 90, ReferenceType::Label));

        assert!(scopes.find_in_scope(root, "x", ReferenceType::Variable, 5).is_none());
        assert!(scopes.find_in_scope(root, "x", ReferenceType::Variable, 10).is_some());
        assert!(scopes.find_in_scope(root, "x", ReferenceType::Label, 20).is_none());
        assert!(scopes.find_in_scope(root, "end", ReferenceType::Label, 0).is_some());
    }
}
