//! Node model
//!
//!     A parsed scene is a [SyntaxTree]: an arena of nodes sharing one envelope (kind, span,
//!     parent, children, issues, side data) addressed by [NodeId]. See [node] for the span and
//!     backtracking rules, [kinds] for the closed set of node kinds, [diagnostics] for the
//!     markers attached to nodes and [visitor] for traversal.
//!
//!     Positions are byte offsets throughout; [range] converts them to line:column pairs.

pub mod diagnostics;
pub mod kinds;
pub mod node;
pub mod range;
pub mod visitor;

pub use diagnostics::{Diagnostic, Level, Marker, Rule};
pub use kinds::{
    CaseFold, CsType, DeclarationKind, Function, NodeKind, OperatorFamily, OperatorKind, Reuse,
    TermForm,
};
pub use node::{Node, NodeId, SyntaxTree, TreeMark};
pub use range::{Position, SourceLocation};
pub use visitor::Visitor;
