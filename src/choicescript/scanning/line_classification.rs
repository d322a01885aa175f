//! Line Classification
//!
//! Scenes are line oriented: what a line is decides how it is tokenized. Before any token of
//! a line is emitted the source is split into lines and each line is classified by looking
//! at its first non-whitespace characters.
//!
//!     Comment   `*comment` followed by whitespace or the end of the line
//!     Command   `*` followed by a letter
//!     Option    `#`
//!     Text      everything else, including `*` followed by a non-letter and blank lines

use serde::Serialize;

/// Classification of one source line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LineType {
    Comment,
    Command,
    Option,
    Text,
}

/// Byte layout of one source line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInfo {
    /// Offset of the first byte of the line
    pub start: usize,
    /// Offset of the first non-whitespace byte (equals `content_end` on blank lines)
    pub content_start: usize,
    /// Offset of the line break, or the end of the source on the last line
    pub content_end: usize,
    /// Offset of the first byte of the next line
    pub end: usize,
    pub line_type: LineType,
}

impl LineInfo {
    pub fn has_indentation(&self) -> bool {
        self.content_start > self.start
    }

    pub fn is_blank(&self) -> bool {
        self.content_start == self.content_end
    }

    pub fn has_line_break(&self) -> bool {
        self.end > self.content_end
    }
}

/// Determine the type of a line from its text after leading whitespace
pub fn classify_line(body: &str) -> LineType {
    if let Some(rest) = body.strip_prefix('*') {
        if let Some(after) = rest.strip_prefix("comment") {
            if after.chars().next().map_or(true, char::is_whitespace) {
                return LineType::Comment;
            }
        }
        if rest.chars().next().is_some_and(char::is_alphabetic) {
            return LineType::Command;
        }
        return LineType::Text;
    }
    if body.starts_with('#') {
        return LineType::Option;
    }
    LineType::Text
}

/// Split a source into classified lines.
///
/// Always returns at least one line, so an empty source is a single blank text line.
pub fn split_lines(source: &str) -> Vec<LineInfo> {
    let mut lines = Vec::new();
    let mut start = 0;

    loop {
        let (content_end, end) = match source[start..].find('\n') {
            Some(rel) => {
                let newline = start + rel;
                let content_end = if newline > start && source.as_bytes()[newline - 1] == b'\r' {
                    newline - 1
                } else {
                    newline
                };
                (content_end, newline + 1)
            }
            None => (source.len(), source.len()),
        };

        let text = &source[start..content_end];
        let trimmed = text.trim_start_matches([' ', '\t']);
        let content_start = content_end - trimmed.len();

        lines.push(LineInfo {
            start,
            content_start,
            content_end,
            end,
            line_type: classify_line(trimmed),
        });

        if end >= source.len() {
            break;
        }
        start = end;
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_line() {
        assert_eq!(classify_line("*comment hello"), LineType::Comment);
        assert_eq!(classify_line("*comment"), LineType::Comment);
        assert_eq!(classify_line("*commentary"), LineType::Command);
        assert_eq!(classify_line("*set x 1"), LineType::Command);
        assert_eq!(classify_line("#Take the sword"), LineType::Option);
        assert_eq!(classify_line("*** scene break ***"), LineType::Text);
        assert_eq!(classify_line("* 5"), LineType::Text);
        assert_eq!(classify_line("Plain prose."), LineType::Text);
        assert_eq!(classify_line(""), LineType::Text);
    }

    #[test]
    fn test_split_lines_layout() {
        let lines = split_lines("*choice\n  #Go\r\n\ntext");

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].line_type, LineType::Command);
        assert_eq!((lines[0].start, lines[0].content_end, lines[0].end), (0, 7, 8));

        assert_eq!(lines[1].line_type, LineType::Option);
        assert_eq!(lines[1].content_start, 10);
        assert_eq!((lines[1].content_end, lines[1].end), (13, 15));

        assert!(lines[2].is_blank());
        assert_eq!(lines[3].line_type, LineType::Text);
        assert!(!lines[3].has_line_break());
    }

    #[test]
    fn test_split_lines_trailing_newline() {
        let lines = split_lines("a\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].end, 2);

        let empty = split_lines("");
        assert_eq!(empty.len(), 1);
        assert!(empty[0].is_blank());
    }
}
