//! The scene scanner
//!
//!     The scanner works over a line-indexed buffer instead of a flat character stream. The
//!     source is split into classified lines up front (see
//!     [line_classification](super::line_classification)) and the classification of the
//!     current line decides which sub-lexer runs:
//!
//!         Command lines   identifiers, numbers, strings and operators (`CommandLexeme`)
//!         Text lines      prose words with internal apostrophes, interpolation sigils (`TextLexeme`)
//!         Comment lines   the whole `*comment ...` body as one token
//!
//!     Both sub-lexers are logos lexers run over the remainder of the current line, one token
//!     at a time. Tokens are produced lazily; the only mutable state is the cursor
//!     ([ScannerPos]), a small `Copy` value. The parser saves it with [Scanner::pos] and
//!     restores it with [Scanner::go_back_to_pos] to backtrack as far as it likes.
//!
//!     The parser can also switch the mode mid-line (`${...}` on a text line holds an
//!     expression, the branches of `@{...}` hold prose).

use super::line_classification::{split_lines, LineInfo, LineType};
use super::token::{IndentUnit, Token, TokenKind};
use crate::choicescript::ast::range::SourceLocation;
use logos::Logos;
use std::sync::Arc;

/// Which sub-lexer produces tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanMode {
    Command,
    Text,
}

impl ScanMode {
    fn for_line(line_type: LineType) -> ScanMode {
        match line_type {
            LineType::Command | LineType::Comment => ScanMode::Command,
            LineType::Option | LineType::Text => ScanMode::Text,
        }
    }
}

/// Snapshot of the scanner cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerPos {
    line: usize,
    offset: usize,
    line_started: bool,
    mode: ScanMode,
}

impl ScannerPos {
    fn start() -> Self {
        Self {
            line: 0,
            offset: 0,
            line_started: false,
            mode: ScanMode::Text,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn line(&self) -> usize {
        self.line
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum CommandLexeme {
    #[regex(r"[0-9]+(\.[0-9]*)?|\.[0-9]+")]
    Num,
    #[regex(r#""([^"\\]|\\.)*""#)]
    String,
    #[regex(r#""([^"\\]|\\.)*\\?"#)]
    BadString,
    #[regex(r"[\p{L}_][\p{L}\p{N}_]*")]
    Ident,
    #[token("%+")]
    FairMathAdd,
    #[token("%-")]
    FairMathSub,
    #[token("<=")]
    LessEq,
    #[token(">=")]
    GreaterEq,
    #[token("!=")]
    NotEq,
    #[token(":")]
    Colon,
    #[token("{")]
    CurlyL,
    #[token("}")]
    CurlyR,
    #[token("[")]
    BracketL,
    #[token("]")]
    BracketR,
    #[token("(")]
    ParenL,
    #[token(")")]
    ParenR,
    #[token(";")]
    SemiColon,
    #[token(",")]
    Comma,
    #[token("*")]
    Asterisk,
    #[token("#")]
    Hash,
    #[token("$")]
    Dollar,
    #[token("@")]
    At,
    #[token("|")]
    Pipe,
}

impl CommandLexeme {
    fn kind(self) -> TokenKind {
        match self {
            CommandLexeme::Num => TokenKind::Num,
            CommandLexeme::String => TokenKind::String,
            CommandLexeme::BadString => TokenKind::BadString,
            CommandLexeme::Ident => TokenKind::Ident,
            CommandLexeme::FairMathAdd => TokenKind::FairMathAdd,
            CommandLexeme::FairMathSub => TokenKind::FairMathSub,
            CommandLexeme::LessEq => TokenKind::LessEq,
            CommandLexeme::GreaterEq => TokenKind::GreaterEq,
            CommandLexeme::NotEq => TokenKind::NotEq,
            CommandLexeme::Colon => TokenKind::Colon,
            CommandLexeme::CurlyL => TokenKind::CurlyL,
            CommandLexeme::CurlyR => TokenKind::CurlyR,
            CommandLexeme::BracketL => TokenKind::BracketL,
            CommandLexeme::BracketR => TokenKind::BracketR,
            CommandLexeme::ParenL => TokenKind::ParenL,
            CommandLexeme::ParenR => TokenKind::ParenR,
            CommandLexeme::SemiColon => TokenKind::SemiColon,
            CommandLexeme::Comma => TokenKind::Comma,
            CommandLexeme::Asterisk => TokenKind::Asterisk,
            CommandLexeme::Hash => TokenKind::Hash,
            CommandLexeme::Dollar => TokenKind::Dollar,
            CommandLexeme::At => TokenKind::At,
            CommandLexeme::Pipe => TokenKind::Pipe,
        }
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum TextLexeme {
    #[regex(r"\p{L}+(['’]\p{L}+)*")]
    Word,
    #[regex(r"[0-9]+(\.[0-9]*)?|\.[0-9]+")]
    Num,
    #[token(":")]
    Colon,
    #[token("{")]
    CurlyL,
    #[token("}")]
    CurlyR,
    #[token("[")]
    BracketL,
    #[token("]")]
    BracketR,
    #[token("(")]
    ParenL,
    #[token(")")]
    ParenR,
    #[token(";")]
    SemiColon,
    #[token(",")]
    Comma,
    #[token("*")]
    Asterisk,
    #[token("#")]
    Hash,
    #[token("$")]
    Dollar,
    #[token("@")]
    At,
    #[token("|")]
    Pipe,
}

impl TextLexeme {
    fn kind(self) -> TokenKind {
        match self {
            TextLexeme::Word => TokenKind::Word,
            TextLexeme::Num => TokenKind::Num,
            TextLexeme::Colon => TokenKind::Colon,
            TextLexeme::CurlyL => TokenKind::CurlyL,
            TextLexeme::CurlyR => TokenKind::CurlyR,
            TextLexeme::BracketL => TokenKind::BracketL,
            TextLexeme::BracketR => TokenKind::BracketR,
            TextLexeme::ParenL => TokenKind::ParenL,
            TextLexeme::ParenR => TokenKind::ParenR,
            TextLexeme::SemiColon => TokenKind::SemiColon,
            TextLexeme::Comma => TokenKind::Comma,
            TextLexeme::Asterisk => TokenKind::Asterisk,
            TextLexeme::Hash => TokenKind::Hash,
            TextLexeme::Dollar => TokenKind::Dollar,
            TextLexeme::At => TokenKind::At,
            TextLexeme::Pipe => TokenKind::Pipe,
        }
    }
}

/// Lazily tokenizes one scene source
#[derive(Debug, Clone)]
pub struct Scanner {
    source: Arc<str>,
    lines: Vec<LineInfo>,
    location: SourceLocation,
    cursor: ScannerPos,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new("")
    }
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Self::from_shared(Arc::from(source))
    }

    pub fn from_shared(source: Arc<str>) -> Self {
        let lines = split_lines(&source);
        let location = SourceLocation::new(&source);
        Self {
            source,
            lines,
            location,
            cursor: ScannerPos::start(),
        }
    }

    /// Replace the source and reset the cursor to its start
    pub fn set_source(&mut self, source: &str) {
        *self = Self::new(source);
    }

    pub fn source(&self) -> &Arc<str> {
        &self.source
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn lines(&self) -> &[LineInfo] {
        &self.lines
    }

    pub fn line_info(&self, line: usize) -> Option<&LineInfo> {
        self.lines.get(line)
    }

    pub fn pos(&self) -> ScannerPos {
        self.cursor
    }

    pub fn go_back_to_pos(&mut self, pos: ScannerPos) {
        self.cursor = pos;
    }

    pub fn mode(&self) -> ScanMode {
        self.cursor.mode
    }

    /// Switch the sub-lexer used for the rest of the current line
    pub fn set_mode(&mut self, mode: ScanMode) {
        self.cursor.mode = mode;
    }

    /// Reposition the cursor at the start of an already emitted token, in the given mode.
    ///
    /// Used to relex a lookahead token after a mode switch. Layout tokens (indentation,
    /// line ends) cannot be relexed and leave the cursor untouched.
    pub fn rewind_to(&mut self, token: &Token, mode: ScanMode) {
        if matches!(
            token.kind,
            TokenKind::Indentation { .. } | TokenKind::EOL | TokenKind::EOF
        ) {
            self.cursor.mode = mode;
            return;
        }
        self.cursor = ScannerPos {
            line: token.position.line,
            offset: token.offset,
            line_started: true,
            mode,
        };
    }

    /// Produce the next token. Always terminates in (and then keeps returning) `EOF`.
    pub fn scan(&mut self) -> Token {
        loop {
            let Some(line) = self.lines.get(self.cursor.line).copied() else {
                return self.eof();
            };

            if !self.cursor.line_started {
                self.cursor.line_started = true;
                self.cursor.offset = line.start;
                self.cursor.mode = ScanMode::for_line(line.line_type);
                if line.has_indentation() {
                    let run = &self.source[line.start..line.content_start];
                    let unit = IndentUnit::classify(run).unwrap_or(IndentUnit::Spaces);
                    let kind = TokenKind::Indentation {
                        width: run.chars().count(),
                        unit,
                    };
                    self.cursor.offset = line.content_start;
                    return self.token(kind, line.start, line.content_start);
                }
            }

            let offset = self.skip_whitespace(self.cursor.offset, line.content_end);
            self.cursor.offset = offset;

            if offset >= line.content_end {
                let has_break = line.has_line_break();
                self.cursor.line += 1;
                self.cursor.line_started = false;
                self.cursor.offset = line.end;
                if has_break {
                    return self.token(TokenKind::EOL, line.content_end, line.end);
                }
                continue;
            }

            if line.line_type == LineType::Comment && offset == line.content_start {
                self.cursor.offset = line.content_end;
                return self.token(TokenKind::SingleLineComment, offset, line.content_end);
            }

            return self.lex_at(offset, line.content_end);
        }
    }

    /// Read one whitespace-delimited run as an `UnquotedString`.
    ///
    /// Falls back to [Scanner::scan] at the end of a line or at the start of a new one.
    pub fn scan_unquoted(&mut self) -> Token {
        let Some(line) = self.lines.get(self.cursor.line).copied() else {
            return self.eof();
        };
        if !self.cursor.line_started {
            return self.scan();
        }
        let start = self.skip_whitespace(self.cursor.offset, line.content_end);
        if start >= line.content_end {
            return self.scan();
        }
        let end = self.source[start..line.content_end]
            .find([' ', '\t'])
            .map_or(line.content_end, |rel| start + rel);
        self.cursor.offset = end;
        self.token(TokenKind::UnquotedString, start, end)
    }

    fn lex_at(&mut self, offset: usize, end: usize) -> Token {
        let slice = &self.source[offset..end];
        let matched = match self.cursor.mode {
            ScanMode::Command => {
                let mut lexer = CommandLexeme::lexer(slice);
                match lexer.next() {
                    Some(Ok(lexeme)) => Some((lexeme.kind(), lexer.span().end)),
                    _ => None,
                }
            }
            ScanMode::Text => {
                let mut lexer = TextLexeme::lexer(slice);
                match lexer.next() {
                    Some(Ok(lexeme)) => Some((lexeme.kind(), lexer.span().end)),
                    _ => None,
                }
            }
        };

        let (kind, len) = match matched {
            Some((kind, len)) if len > 0 => (kind, len),
            _ => {
                // Unmatched input becomes a single-character delimiter
                let ch = slice.chars().next().unwrap_or('\0');
                (TokenKind::Delim(ch), ch.len_utf8())
            }
        };

        self.cursor.offset = offset + len;
        self.token(kind, offset, offset + len)
    }

    fn skip_whitespace(&self, mut offset: usize, end: usize) -> usize {
        let bytes = self.source.as_bytes();
        while offset < end && matches!(bytes[offset], b' ' | b'\t') {
            offset += 1;
        }
        offset
    }

    fn token(&self, kind: TokenKind, start: usize, end: usize) -> Token {
        Token::new(
            kind,
            &self.source[start..end],
            start,
            self.location.byte_to_position(start),
        )
    }

    fn eof(&self) -> Token {
        let end = self.source.len();
        self.token(TokenKind::EOF, end, end)
    }
}

/// Convenience function to tokenize a whole source, `EOF` included
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = scanner.scan();
        let done = token.kind == TokenKind::EOF;
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}
