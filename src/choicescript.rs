//! Main module for choicescript library functionality
//!
//! Data flows one way: text is scanned, the tokens parsed into a tree, the tree walked into
//! scopes, and trees plus scopes of every scene registered in the project index.

pub mod ast;
pub mod config;
pub mod error;
pub mod formats;
pub mod parsing;
pub mod project;
pub mod scanning;
pub mod scoping;
