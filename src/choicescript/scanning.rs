//! Scanning
//!
//!     Turns scene text into positioned tokens. Scenes are indentation sensitive and line
//!     oriented, so scanning happens in two layers:
//!
//!         1. Line classification. See [line_classification]. The source is split into lines,
//!            each tagged Comment, Command, Option or Text.
//!
//!         2. Token scanning. See [scanner]. Tokens are produced one at a time, the line's
//!            classification selecting the sub-lexer. Leading whitespace becomes a single
//!            Indentation token per line and every line break an EOL token.
//!
//!     Scanning never fails: unterminated strings become `BadString` tokens, stray characters
//!     become `Delim` tokens, and every source ends in an `EOF` token.

pub mod line_classification;
pub mod scanner;
pub mod token;

pub use line_classification::{classify_line, split_lines, LineInfo, LineType};
pub use scanner::{tokenize, ScanMode, Scanner, ScannerPos};
pub use token::{IndentUnit, Token, TokenKind};
