//! Parsing
//!
//!     Turns a scene source into a [SyntaxTree]. Parsing never fails: problems are recorded as
//!     markers on the nodes where they were found and the rest of the scene parses normally.
//!
//!     The parser is split by concern:
//!
//!         [parser]         token machinery, backtracking, lines and indented blocks
//!         statements       command grammars and choice options
//!         expressions      the expression grammar and type inference
//!         replacements     prose, `${}` and `@{}` replacements
//!         [commands]       command and keyword tables
//!         [rules]          the rules markers are reported under
//!
//!     Usage
//!
//!         let tree = parse_scene("*temp gold 10\nYou have ${gold} coins.", Some("startup"), ParseOptions::default());
//!         assert!(tree.collect_issues(tree.root()).is_empty());

pub mod commands;
mod expressions;
pub mod parser;
mod replacements;
pub mod rules;
mod statements;

use crate::choicescript::ast::{Level, SyntaxTree};

pub use commands::{classify_command, is_reserved, CommandClass};
pub use parser::Parser;

/// Levels for the markers whose severity is configurable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub mixed_indentation: Level,
    pub deprecated_modulo: Level,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            mixed_indentation: Level::Warning,
            deprecated_modulo: Level::Warning,
        }
    }
}

/// Parse a scene source
pub fn parse_scene(source: &str, name: Option<&str>, options: ParseOptions) -> SyntaxTree {
    Parser::new(source, options).parse_scene(name, None)
}
