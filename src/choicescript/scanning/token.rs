//! Token definitions
//!
//!     A token is an immutable value: its kind, the exact source text it covers, the byte
//!     offset and length of that text and the line:column where it starts. The scanner
//!     guarantees that `source[token.offset..token.offset + token.length] == token.text`
//!     for every token it emits (the EOF token has an empty text at the end of the source).
//!
//!     Whitespace inside a line is never emitted. Leading whitespace is emitted once per line
//!     as a single `Indentation` token that records its width and whether it was made of
//!     spaces, tabs or a mix of both.

use crate::choicescript::ast::range::Position;
use serde::Serialize;
use std::fmt;

/// Character class of a run of leading whitespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentUnit {
    Spaces,
    Tabs,
    Mixed,
}

impl IndentUnit {
    /// Classify a run of whitespace. Returns `None` for an empty run.
    pub fn classify(run: &str) -> Option<IndentUnit> {
        let spaces = run.contains(' ');
        let tabs = run.contains('\t');
        match (spaces, tabs) {
            (true, true) => Some(IndentUnit::Mixed),
            (true, false) => Some(IndentUnit::Spaces),
            (false, true) => Some(IndentUnit::Tabs),
            (false, false) => None,
        }
    }
}

/// All token kinds produced by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // Structural punctuation
    Colon,
    CurlyL,
    CurlyR,
    BracketL,
    BracketR,
    ParenL,
    ParenR,
    SemiColon,
    Comma,
    /// `*`, the command sigil (and multiplication inside expressions)
    Asterisk,
    /// `#`, the option sigil
    Hash,
    /// `$`, the interpolation sigil
    Dollar,
    /// `@`, the multi-replace sigil
    At,
    Pipe,

    // Literals
    Num,
    String,
    UnquotedString,
    /// A string literal without its closing quote; spans to the end of the line
    BadString,

    // Identifiers
    /// Identifier on a command line or inside an expression
    Ident,
    /// Prose word on a text line, internal apostrophes included
    Word,

    // Composite operators
    /// `%+`
    FairMathAdd,
    /// `%-`
    FairMathSub,
    LessEq,
    GreaterEq,
    NotEq,

    // Layout
    Indentation { width: usize, unit: IndentUnit },
    EOL,
    /// A whole `*comment ...` line body
    SingleLineComment,

    /// Any other single character
    Delim(char),
    EOF,
}

impl TokenKind {
    /// True for the tokens that end a line
    pub fn is_line_end(&self) -> bool {
        matches!(self, TokenKind::EOL | TokenKind::EOF)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Delim(ch) => write!(f, "Delim({ch})"),
            TokenKind::Indentation { width, unit } => write!(f, "Indentation({width}, {unit:?})"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// A positioned token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub text: String,
    pub offset: usize,
    pub length: usize,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: &str, offset: usize, position: Position) -> Self {
        Self {
            kind,
            text: text.to_string(),
            offset,
            length: text.len(),
            position,
        }
    }

    /// Byte offset one past the end of the token
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn is_delim(&self, ch: char) -> bool {
        self.kind == TokenKind::Delim(ch)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} @{}", self.kind, self.text, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_unit_classification() {
        assert_eq!(IndentUnit::classify("    "), Some(IndentUnit::Spaces));
        assert_eq!(IndentUnit::classify("\t\t"), Some(IndentUnit::Tabs));
        assert_eq!(IndentUnit::classify(" \t"), Some(IndentUnit::Mixed));
        assert_eq!(IndentUnit::classify(""), None);
    }

    #[test]
    fn test_token_end() {
        let token = Token::new(TokenKind::Ident, "var1", 6, Position::new(0, 6));
        assert_eq!(token.length, 4);
        assert_eq!(token.end(), 10);
    }
}
