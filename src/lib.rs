//! # choicescript
//!
//! Scanner, parser, scope resolver and project index for ChoiceScript interactive fiction.
//!
//! File Layout
//!
//! src/choicescript
//!   ├── scanning     Line classification and the two-mode scanner
//!   ├── parsing      Recursive descent into a typed, error tolerant tree
//!   ├── ast          The node arena, node kinds, markers and traversal
//!   ├── scoping      Lexical scopes and symbol lookup for one scene
//!   ├── project      The multi-scene index and cross-scene navigation
//!   ├── formats      Tree renderers (treeviz, json)
//!   └── config       Layered settings over embedded defaults
//!
//! Nothing in the pipeline fails on bad input: problems are reported as markers on the
//! nodes they concern, and every scene still yields a complete tree.

#![allow(rustdoc::invalid_html_tags)]

pub mod choicescript;
