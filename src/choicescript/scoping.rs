//! Scope resolution
//!
//!     Builds the lexical scopes of a parsed scene and answers symbol lookups over them.
//!
//!         [scope]      the scope arena and the symbols bound in it
//!         [builder]    the visitor that fills a scope tree from a syntax tree
//!         [symbols]    lookups: by name and offset, from a node, all references
//!
//!     Scopes hold node ids pointing back into the tree; the tree never knows about scopes
//!     beyond the side table annotation written by [build_scopes].

pub mod builder;
pub mod scope;
pub mod symbols;

pub use builder::{build_scopes, ScopeBuilder, SCOPE_DATA_KEY};
pub use scope::{ReferenceType, Scope, ScopeId, ScopeTree, Symbol};
pub use symbols::{reference_type_of, Symbols};
