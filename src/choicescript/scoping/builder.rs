//! Scope builder
//!
//! A [Visitor] that walks a parsed scene in pre-order and records its bindings:
//!
//!     ChoiceOption, *if/*elseif/*else      open a child scope covering the construct
//!     *temp name                           binds in the innermost scope
//!     *create name                         binds in the scene's root scope
//!     *params a b                          binds each name in the innermost scope
//!     *label name                          binds in the innermost scope
//!
//! The tree itself is only read. After the walk [build_scopes] annotates declaring nodes
//! through the side table with the scope they bound in.

use super::scope::{ReferenceType, ScopeId, ScopeTree, Symbol};
use crate::choicescript::ast::{CsType, DeclarationKind, NodeId, NodeKind, SyntaxTree, Visitor};
use serde_json::Value;
use tracing::debug;

/// Side table key holding the scope a declaration bound in
pub const SCOPE_DATA_KEY: &str = "scope";

/// Builds the [ScopeTree] of one scene
#[derive(Debug, Default)]
pub struct ScopeBuilder {
    scopes: ScopeTree,
    bindings: Vec<(NodeId, ScopeId)>,
}

impl ScopeBuilder {
    pub fn new(scopes: ScopeTree) -> Self {
        Self {
            scopes,
            bindings: Vec::new(),
        }
    }

    pub fn finish(self) -> ScopeTree {
        self.scopes
    }

    fn open_scope(&mut self, tree: &SyntaxTree, node: NodeId) {
        let (offset, length) = {
            let node = tree.node(node);
            (node.offset, node.length)
        };
        let parent = self.scopes.find_scope(offset, length);
        self.scopes.add_child(parent, offset, length);
    }

    fn innermost(&self, tree: &SyntaxTree, node: NodeId) -> ScopeId {
        let node = tree.node(node);
        self.scopes.find_scope(node.offset, node.length)
    }

    fn bind(&mut self, scope: ScopeId, symbol: Symbol) {
        self.bindings.push((symbol.node, scope));
        self.scopes.add_symbol(scope, symbol);
    }

    fn declare_variable(&mut self, tree: &SyntaxTree, node: NodeId, kind: DeclarationKind) {
        let children = tree.children(node);
        let Some(name) = children
            .iter()
            .find(|child| *tree.kind(**child) == NodeKind::Variable)
        else {
            return;
        };
        let value = children.iter().find(|child| tree.kind(**child).is_expression());

        let scope = match kind {
            DeclarationKind::Temp => self.innermost(tree, node),
            DeclarationKind::Create => self.scopes.root(),
        };
        let symbol = Symbol {
            name: tree.text(*name).to_string(),
            value: value.map(|value| tree.text(*value).to_string()),
            reference_type: ReferenceType::Variable,
            node,
            offset: tree.node(node).offset,
            value_type: value
                .and_then(|value| tree.kind(*value).cs_type())
                .unwrap_or(CsType::Unknown),
            declaration: Some(kind),
        };
        self.bind(scope, symbol);
    }

    fn declare_parameters(&mut self, tree: &SyntaxTree, node: NodeId) {
        let scope = self.innermost(tree, node);
        for parameter in tree.children(node) {
            if *tree.kind(*parameter) != NodeKind::Variable {
                continue;
            }
            let symbol = Symbol {
                name: tree.text(*parameter).to_string(),
                value: None,
                reference_type: ReferenceType::Variable,
                node,
                offset: tree.node(node).offset,
                value_type: CsType::Unknown,
                declaration: Some(DeclarationKind::Temp),
            };
            self.bind(scope, symbol);
        }
    }

    fn declare_label(&mut self, tree: &SyntaxTree, node: NodeId) {
        let Some(label) = tree.find_child(node, |kind| *kind == NodeKind::Label) else {
            return;
        };
        let scope = self.innermost(tree, node);
        let symbol = Symbol {
            name: tree.text(label).to_string(),
            value: None,
            reference_type: ReferenceType::Label,
            node,
            offset: tree.node(node).offset,
            value_type: CsType::Unknown,
            declaration: None,
        };
        self.bind(scope, symbol);
    }
}

impl Visitor for ScopeBuilder {
    fn visit_node(&mut self, tree: &SyntaxTree, node: NodeId) -> bool {
        match tree.kind(node) {
            NodeKind::ChoiceOption { .. } => self.open_scope(tree, node),
            NodeKind::StandardCommand { name } => match name.as_str() {
                "if" | "elseif" | "elsif" | "else" => self.open_scope(tree, node),
                "params" => self.declare_parameters(tree, node),
                _ => {}
            },
            NodeKind::VariableDeclaration { kind } => self.declare_variable(tree, node, *kind),
            NodeKind::LabelDeclaration => self.declare_label(tree, node),
            _ => {}
        }
        true
    }
}

/// Build the scopes of a parsed scene and annotate its declarations
pub fn build_scopes(tree: &mut SyntaxTree) -> ScopeTree {
    let mut builder = ScopeBuilder::new(ScopeTree::new());
    tree.accept_visitor(tree.root(), &mut builder);

    for (node, scope) in &builder.bindings {
        tree.set_data(*node, SCOPE_DATA_KEY, Value::from(scope.index()));
    }

    let scopes = builder.finish();
    debug!(
        scopes = scopes.len(),
        symbols = scopes.all_symbols().count(),
        "built scope tree"
    );
    scopes
}
