//! Parser core
//!
//!     A hand written recursive descent parser over the [Scanner]. The parser keeps one token
//!     of lookahead (`token`) and the token consumed last (`prev`); a node being built is
//!     finished by extending it to the end of `prev`.
//!
//!     Grammar rules
//!
//!         Every `parse_*` rule either recognises its construct or restores the position it
//!         started from and returns `None`. Restoring is cheap: [ParserMark] is a copy of the
//!         scanner cursor, the current tokens and the length of the node arena. Once a rule has
//!         committed (it consumed the token that identifies its construct) problems become
//!         markers on the partially built node and the rule still returns it.
//!
//!     Lines and blocks
//!
//!         Every source line becomes a `Line` node. Constructs that own an indented body
//!         (choices, options, conditionals, scene lists) adopt the following lines whose
//!         indentation is deeper than the line that opened them. Depth is always compared to
//!         the opening line, never to an absolute column, and blank lines never end a block.
//!
//!     Resynchronisation
//!
//!         A committed rule that meets something it cannot use skips to the end of the line.
//!         Every line therefore starts parsing from a clean state, whatever went wrong on the
//!         lines before it.

use super::rules;
use super::ParseOptions;
use crate::choicescript::ast::{Level, Marker, NodeId, NodeKind, Rule, SyntaxTree, TreeMark};
use crate::choicescript::scanning::{
    IndentUnit, LineType, ScanMode, Scanner, ScannerPos, Token, TokenKind,
};
use tracing::debug;

/// Where a line sits, which decides what it may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockContext {
    /// Top level of a scene
    Scene,
    /// Body of an option or a conditional
    Body,
    /// Directly inside `*choice` or `*fake_choice`
    Choice,
    /// Lines of `*scene_list`
    SceneList,
    /// Free text lines of `*stat_chart` and `*achievement`
    Prose,
}

/// A parsed line content, with the context of the block it opens (if any)
#[derive(Debug, Clone, Copy)]
pub(crate) struct Statement {
    pub node: NodeId,
    pub block: Option<BlockContext>,
}

impl Statement {
    pub fn line(node: NodeId) -> Self {
        Self { node, block: None }
    }

    pub fn with_block(node: NodeId, context: BlockContext) -> Self {
        Self {
            node,
            block: Some(context),
        }
    }
}

/// Indentation unit established by the first indented line of a scene
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct IndentState {
    unit: Option<IndentUnit>,
}

/// Snapshot for backtracking
#[derive(Debug, Clone)]
pub(crate) struct ParserMark {
    pos: ScannerPos,
    tree: TreeMark,
    token: Token,
    prev: Option<Token>,
}

/// Scene parser
pub struct Parser {
    pub(super) scanner: Scanner,
    pub(super) tree: SyntaxTree,
    pub(super) token: Token,
    pub(super) prev: Option<Token>,
    pub(super) options: ParseOptions,
}

impl Parser {
    pub fn new(source: &str, options: ParseOptions) -> Self {
        let mut scanner = Scanner::new(source);
        let tree = SyntaxTree::new(scanner.source().clone());
        let token = scanner.scan();
        Self {
            scanner,
            tree,
            token,
            prev: None,
            options,
        }
    }

    /// Parse the whole source into a tree rooted at a `Scene` node
    pub fn parse_scene(mut self, name: Option<&str>, uri: Option<&str>) -> SyntaxTree {
        let scene = self.tree.create(
            NodeKind::Scene {
                name: name.map(str::to_string),
                uri: uri.map(str::to_string),
            },
            0,
        );

        let mut indent = IndentState::default();
        while self.token.kind != TokenKind::EOF {
            let line = self.parse_line(BlockContext::Scene, &mut indent);
            self.tree.adopt_child(scene, line, None);
        }
        let len = self.tree.source().len();
        self.tree.set_end(scene, len);

        debug!(
            scene = name.unwrap_or("<anonymous>"),
            lines = self.scanner.lines().len(),
            nodes = self.tree.len(),
            issues = self.tree.collect_issues(scene).len(),
            "parsed scene"
        );
        self.tree
    }

    // ---- token machinery ----

    pub(super) fn consume_token(&mut self) {
        let next = self.scanner.scan();
        self.prev = Some(std::mem::replace(&mut self.token, next));
    }

    pub(super) fn mark(&self) -> ParserMark {
        ParserMark {
            pos: self.scanner.pos(),
            tree: self.tree.mark(),
            token: self.token.clone(),
            prev: self.prev.clone(),
        }
    }

    pub(super) fn restore(&mut self, mark: ParserMark) {
        self.scanner.go_back_to_pos(mark.pos);
        self.tree.truncate(mark.tree);
        self.token = mark.token;
        self.prev = mark.prev;
    }

    pub(super) fn peek(&self, kind: TokenKind) -> bool {
        self.token.kind == kind
    }

    pub(super) fn peek_delim(&self, ch: char) -> bool {
        self.token.is_delim(ch)
    }

    pub(super) fn peek_keyword(&self, word: &str) -> bool {
        self.token.kind == TokenKind::Ident && self.token.text == word
    }

    pub(super) fn accept(&mut self, kind: TokenKind) -> bool {
        if self.peek(kind) {
            self.consume_token();
            return true;
        }
        false
    }

    pub(super) fn at_line_end(&self) -> bool {
        self.token.kind.is_line_end()
    }

    /// True when the current token starts exactly where the previous one ended
    pub(super) fn is_adjacent(&self) -> bool {
        self.prev
            .as_ref()
            .is_some_and(|prev| prev.end() == self.token.offset)
    }

    /// Switch the sub-lexer and relex the lookahead token with it
    pub(super) fn switch_mode(&mut self, mode: ScanMode) {
        if matches!(
            self.token.kind,
            TokenKind::Indentation { .. } | TokenKind::EOL | TokenKind::EOF
        ) {
            self.scanner.set_mode(mode);
            return;
        }
        if self.scanner.mode() == mode && self.token_lexed_in(mode) {
            return;
        }
        self.scanner.rewind_to(&self.token, mode);
        self.token = self.scanner.scan();
    }

    fn token_lexed_in(&self, mode: ScanMode) -> bool {
        match self.token.kind {
            TokenKind::Word => mode == ScanMode::Text,
            TokenKind::Ident | TokenKind::String | TokenKind::BadString => {
                mode == ScanMode::Command
            }
            _ => false,
        }
    }

    /// Relex the lookahead as one whitespace-delimited run. False at the end of a line.
    pub(super) fn rescan_unquoted(&mut self) -> bool {
        if self.at_line_end() {
            return false;
        }
        let mode = self.scanner.mode();
        self.scanner.rewind_to(&self.token, mode);
        self.token = self.scanner.scan_unquoted();
        self.token.kind == TokenKind::UnquotedString
    }

    // ---- node building ----

    pub(super) fn create_node(&mut self, kind: NodeKind) -> NodeId {
        self.tree.create(kind, self.token.offset)
    }

    /// Extend a node to the end of the last consumed token
    pub(super) fn finish(&mut self, node: NodeId) -> NodeId {
        if let Some(end) = self.prev.as_ref().map(Token::end) {
            self.tree.set_end(node, end);
        }
        node
    }

    /// Consume the current token as a leaf node
    pub(super) fn leaf(&mut self, kind: NodeKind) -> NodeId {
        let node = self.create_node(kind);
        self.consume_token();
        self.finish(node)
    }

    pub(super) fn adopt(&mut self, parent: NodeId, child: NodeId) {
        self.tree.adopt_child(parent, child, None);
    }

    // ---- markers ----

    pub(super) fn add_marker(
        &mut self,
        node: NodeId,
        rule: Rule,
        level: Level,
        offset: usize,
        length: usize,
    ) {
        if level == Level::Ignore {
            return;
        }
        self.tree
            .add_issue(node, Marker::new(node, offset, length, rule, level));
    }

    /// Mark an error at the current token (an empty range at the end of a line)
    pub(super) fn mark_error(&mut self, node: NodeId, rule: Rule) {
        let length = if self.at_line_end() {
            0
        } else {
            self.token.length
        };
        self.add_marker(node, rule, Level::Error, self.token.offset, length);
    }

    pub(super) fn resync_to_line_end(&mut self) {
        while !self.at_line_end() {
            self.consume_token();
        }
    }

    /// Consume a closing token. When it is missing, skip the rest of the line and mark the
    /// absence at the line end, so nothing after the opening token is reused.
    pub(super) fn expect_closing(&mut self, node: NodeId, kind: TokenKind, rule: Rule) -> bool {
        if self.accept(kind) {
            return true;
        }
        self.resync_to_line_end();
        self.mark_error(node, rule);
        false
    }

    /// Mark and skip anything left on the line, then finish the node
    pub(super) fn expect_line_end(&mut self, node: NodeId) -> NodeId {
        if !self.at_line_end() {
            let start = self.token.offset;
            self.resync_to_line_end();
            let end = self.prev.as_ref().map_or(start, Token::end);
            self.add_marker(
                node,
                rules::UNEXPECTED_TOKEN,
                Level::Error,
                start,
                end.saturating_sub(start),
            );
        }
        self.finish(node)
    }

    /// Mark an error, skip the rest of the line and finish the node
    pub(super) fn fail_line(&mut self, node: NodeId, rule: Rule) -> NodeId {
        self.mark_error(node, rule);
        self.resync_to_line_end();
        self.finish(node)
    }

    // ---- lines and blocks ----

    fn parse_line(&mut self, context: BlockContext, indent: &mut IndentState) -> NodeId {
        let number = self.token.position.line;
        let info = self.scanner.line_info(number).copied();
        let line_type = info.map_or(LineType::Text, |info| info.line_type);
        let start = info.map_or(self.token.offset, |info| info.start);
        let line = self.tree.create(
            NodeKind::Line {
                number,
                indent: 0,
                line_type,
            },
            start,
        );

        let mut width = 0;
        if let TokenKind::Indentation { width: depth, unit } = self.token.kind {
            let node = self.leaf(NodeKind::Indentation { depth, unit });
            self.adopt(line, node);
            width = depth;
            if !self.at_line_end() {
                self.check_indentation(node, unit, indent);
            }
            *self.tree.kind_mut(line) = NodeKind::Line {
                number,
                indent: depth,
                line_type,
            };
        }

        let statement = self.parse_statement(context, line_type);
        if let Some(statement) = statement {
            self.adopt(line, statement.node);
        }
        if !self.at_line_end() {
            // statements always stop at the line end; guard against leftovers
            self.expect_line_end(line);
        }
        self.finish(line);
        self.accept(TokenKind::EOL);

        if let Some(Statement {
            node,
            block: Some(block),
        }) = statement
        {
            self.parse_block(node, width, block, indent);
            self.close_block(node);
        }
        line
    }

    fn check_indentation(&mut self, node: NodeId, unit: IndentUnit, indent: &mut IndentState) {
        let mixed = match (unit, indent.unit) {
            (IndentUnit::Mixed, _) => true,
            (unit, Some(established)) => unit != established,
            (unit, None) => {
                indent.unit = Some(unit);
                false
            }
        };
        if mixed {
            let (offset, length) = {
                let node = self.tree.node(node);
                (node.offset, node.length)
            };
            let level = self.options.mixed_indentation;
            self.add_marker(node, rules::MIXED_INDENTATION, level, offset, length);
        }
    }

    /// Adopt every following line indented deeper than `owner_indent`
    fn parse_block(
        &mut self,
        owner: NodeId,
        owner_indent: usize,
        context: BlockContext,
        indent: &mut IndentState,
    ) {
        while let Some(next) = self.peek_next_indent() {
            if next <= owner_indent {
                break;
            }
            let line = self.parse_line(context, indent);
            self.adopt(owner, line);
        }
    }

    /// Indentation of the next non-blank line, `None` at the end of the source
    fn peek_next_indent(&mut self) -> Option<usize> {
        let mark = self.mark();
        let result = loop {
            let mut width = 0;
            if let TokenKind::Indentation { width: depth, .. } = self.token.kind {
                width = depth;
                self.consume_token();
            }
            match self.token.kind {
                TokenKind::EOL => self.consume_token(),
                TokenKind::EOF => break None,
                _ => break Some(width),
            }
        };
        self.restore(mark);
        result
    }

    fn close_block(&mut self, owner: NodeId) {
        if let NodeKind::ChoiceCommand { .. } = self.tree.kind(owner) {
            let mut has_option = false;
            self.tree.accept(owner, |tree, node| {
                if matches!(tree.kind(node), NodeKind::ChoiceOption { .. }) {
                    has_option = true;
                }
                !has_option
            });
            if !has_option {
                let offset = self.tree.node(owner).offset;
                let length = self
                    .tree
                    .kind(owner)
                    .command_name()
                    .map_or(1, |name| name.len() + 1);
                self.add_marker(owner, rules::NO_CHOICE_OPTIONS, Level::Error, offset, length);
            }
        }
    }

    fn parse_statement(
        &mut self,
        context: BlockContext,
        line_type: LineType,
    ) -> Option<Statement> {
        match self.token.kind {
            TokenKind::EOL | TokenKind::EOF => return None,
            TokenKind::SingleLineComment => {
                return Some(Statement::line(self.leaf(NodeKind::Comment)))
            }
            _ => {}
        }

        let statement = match (context, line_type) {
            (BlockContext::SceneList, _) => self.parse_scene_list_entry(),
            (BlockContext::Prose, _) => self.parse_text_line(),
            (BlockContext::Choice, LineType::Option) => self.parse_choice_option(),
            (_, LineType::Option) => {
                let statement = self.parse_choice_option();
                let (offset, length) = (self.tree.node(statement.node).offset, 1);
                self.add_marker(
                    statement.node,
                    rules::OPTION_OUTSIDE_CHOICE,
                    Level::Error,
                    offset,
                    length,
                );
                statement
            }
            (_, LineType::Command) if self.peek(TokenKind::Asterisk) => {
                self.parse_command(context)
            }
            _ => self.parse_text_line(),
        };

        if context == BlockContext::Choice && !self.allowed_in_choice(statement.node) {
            let offset = self.tree.node(statement.node).offset;
            let end = self.prev.as_ref().map_or(offset, Token::end);
            self.add_marker(
                statement.node,
                rules::CHOICE_OPTION_EXPECTED,
                Level::Error,
                offset,
                end.saturating_sub(offset),
            );
        }
        Some(statement)
    }

    fn allowed_in_choice(&self, node: NodeId) -> bool {
        match self.tree.kind(node) {
            NodeKind::ChoiceOption { .. } | NodeKind::Comment => true,
            NodeKind::StandardCommand { name } => {
                matches!(name.as_str(), "if" | "elseif" | "elsif" | "else")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> SyntaxTree {
        Parser::new(source, ParseOptions::default()).parse_scene(None, None)
    }

    fn rule_ids(tree: &SyntaxTree) -> Vec<&'static str> {
        tree.collect_issues(tree.root())
            .iter()
            .map(|marker| marker.rule().id)
            .collect()
    }

    #[test]
    fn test_blocks_nest_by_indentation() {
        let source = "*if a\n  *if b\n    Deep\n  Shallow\nTop\n";
        let tree = parse(source);

        let top_lines = tree.children(tree.root()).len();
        assert_eq!(top_lines, 2);

        let outer = tree
            .ids()
            .find(|id| tree.kind(*id).command_name() == Some("if"))
            .unwrap();
        let nested: Vec<_> = tree.children(outer)[1..]
            .iter()
            .map(|line| tree.text(*line).trim())
            .collect();
        assert_eq!(nested, vec!["*if b\n    Deep", "Shallow"]);
    }

    #[test]
    fn test_blank_lines_do_not_close_blocks() {
        let tree = parse("*if a\n  One\n\n  Two\nThree\n");
        let outer = tree
            .ids()
            .find(|id| tree.kind(*id).command_name() == Some("if"))
            .unwrap();
        // condition, One, the blank line, Two
        assert_eq!(tree.children(outer).len(), 4);
    }

    #[test]
    fn test_comments_are_allowed_in_choices() {
        let tree = parse("*choice\n  *comment options follow\n  #Go\n    Gone.\n");
        assert!(rule_ids(&tree).is_empty());
        assert!(tree.ids().any(|id| *tree.kind(id) == NodeKind::Comment));
    }

    #[test]
    fn test_mixed_run_is_marked() {
        let tree = parse("*if a\n \tMixed\n");
        assert_eq!(rule_ids(&tree), vec!["mixed-indentation"]);
    }

    #[test]
    fn test_empty_choice_before_dedent() {
        let tree = parse("*choice\nNo options here.\n");
        assert_eq!(rule_ids(&tree), vec!["no-choice-options"]);
    }

    #[test]
    fn test_mark_and_restore() {
        let mut parser = Parser::new("*set x 1", ParseOptions::default());
        let mark = parser.mark();
        let nodes = parser.tree.len();
        parser.consume_token();
        parser.leaf(NodeKind::Variable);
        parser.restore(mark);
        assert_eq!(parser.tree.len(), nodes);
        assert_eq!(parser.token.kind, TokenKind::Asterisk);
        assert!(parser.prev.is_none());
    }
}
