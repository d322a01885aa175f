//! Position tracking for source locations
//!
//! Nodes, tokens and markers are located by byte `offset` and `length`. Tooling that talks
//! to editors needs line:column pairs instead, so this module converts between the two.
//!
//! ## Key Design
//!
//! - **Byte offsets are canonical**: everything in the tree is stored as offsets, positions
//!   are derived on demand
//! - **Columns are byte columns**: a column is the byte distance from the start of its line
//! - **Efficient conversion**: O(log n) binary search over precomputed line starts

use serde::Serialize;
use std::fmt;

/// Represents a position in source code (line and column, both zero based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Provides fast conversion between byte offsets and line/column positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
    len: usize,
}

impl SourceLocation {
    /// Create a new SourceLocation from source code
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];

        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }

        Self {
            line_starts,
            len: source.len(),
        }
    }

    /// Convert a byte offset to a line/column position
    ///
    /// Offsets past the end of the source clamp to the end.
    pub fn byte_to_position(&self, byte_offset: usize) -> Position {
        let byte_offset = byte_offset.min(self.len);
        let line = self
            .line_starts
            .binary_search(&byte_offset)
            .unwrap_or_else(|i| i - 1);

        Position::new(line, byte_offset - self.line_starts[line])
    }

    /// Convert a line/column position back to a byte offset
    ///
    /// Lines past the end clamp to the end of the source, columns past the end of their
    /// line clamp to the line end.
    pub fn position_to_byte(&self, position: Position) -> usize {
        let Some(start) = self.line_start(position.line) else {
            return self.len;
        };
        let end = self.line_end(position.line).unwrap_or(self.len);
        (start + position.column).min(end)
    }

    /// Get the total number of lines in the source
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get the byte offset for the start of a line
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Byte offset one past the last character of a line, including its line break
    pub fn line_end(&self, line: usize) -> Option<usize> {
        if line >= self.line_starts.len() {
            return None;
        }
        Some(self.line_starts.get(line + 1).copied().unwrap_or(self.len))
    }

    /// Total length of the source in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
