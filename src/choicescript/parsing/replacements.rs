//! Text and replacements
//!
//! Prose is kept as `RealWord` nodes, one per word, so spell checking works on whole words.
//! Two constructs interrupt prose:
//!
//!     ${expr}  $!{expr}  $!!{expr}      VariableReplacement (plain, capitalised, upper case)
//!     @{selector text|text|...}         MultiReplace > selector, MultiReplaceOption...
//!
//! Inside the braces the scanner switches to command mode, and back to text mode once the
//! closing brace is consumed. Branches of a multi-replace are prose, not expressions.

use super::parser::{Parser, Statement};
use super::rules;
use crate::choicescript::ast::{CaseFold, Level, NodeId, NodeKind};
use crate::choicescript::scanning::{ScanMode, TokenKind};

impl Parser {
    pub(super) fn parse_text_line(&mut self) -> Statement {
        let node = self.create_node(NodeKind::TextLine);
        self.parse_text_content(node, &[]);
        Statement::line(self.finish(node))
    }

    /// Words and replacements up to the end of the line or one of `stops`
    pub(super) fn parse_text_content(&mut self, parent: NodeId, stops: &[TokenKind]) {
        while !self.at_line_end() && !stops.contains(&self.token.kind) {
            let child = match self.token.kind {
                TokenKind::Word => Some(self.leaf(NodeKind::RealWord)),
                TokenKind::Dollar => self.parse_variable_replacement(),
                TokenKind::At => self.parse_multireplace(),
                _ => None,
            };
            match child {
                Some(child) => self.adopt(parent, child),
                None => self.consume_token(),
            }
        }
    }

    /// Backtracks unless `$`, `$!` or `$!!` is directly followed by `{`
    fn parse_variable_replacement(&mut self) -> Option<NodeId> {
        let mark = self.mark();
        let node = self.create_node(NodeKind::VariableReplacement {
            case_fold: CaseFold::None,
        });
        self.consume_token();

        let mut bangs = 0;
        while self.peek_delim('!') && self.is_adjacent() {
            self.consume_token();
            bangs += 1;
        }
        let case_fold = match bangs {
            0 => CaseFold::None,
            1 => CaseFold::Capitalize,
            2 => CaseFold::Upper,
            _ => {
                self.restore(mark);
                return None;
            }
        };
        if !(self.peek(TokenKind::CurlyL) && self.is_adjacent()) {
            self.restore(mark);
            return None;
        }
        *self.tree.kind_mut(node) = NodeKind::VariableReplacement { case_fold };

        self.consume_token();
        self.switch_mode(ScanMode::Command);
        match self.parse_expression() {
            Some(expression) => self.adopt(node, expression),
            None => self.mark_error(node, rules::EXPRESSION_EXPECTED),
        }
        self.close_replacement(node);
        Some(self.finish(node))
    }

    /// Backtracks unless `@` is directly followed by `{`
    fn parse_multireplace(&mut self) -> Option<NodeId> {
        let mark = self.mark();
        let node = self.create_node(NodeKind::MultiReplace);
        self.consume_token();
        if !(self.peek(TokenKind::CurlyL) && self.is_adjacent()) {
            self.restore(mark);
            return None;
        }
        self.consume_token();

        self.switch_mode(ScanMode::Command);
        match self.parse_term() {
            Some(selector) => self.adopt(node, selector),
            None => self.mark_error(node, rules::EXPRESSION_EXPECTED),
        }
        self.switch_mode(ScanMode::Text);

        let mut options = 0;
        loop {
            let option = self.create_node(NodeKind::MultiReplaceOption);
            self.parse_text_content(option, &[TokenKind::Pipe, TokenKind::CurlyR]);
            self.finish(option);
            self.adopt(node, option);
            options += 1;
            if !self.accept(TokenKind::Pipe) {
                break;
            }
        }

        if options < 2 {
            let offset = self.tree.node(node).offset;
            let end = self.tree.node(node).end();
            self.add_marker(
                node,
                rules::NOT_ENOUGH_MULTIREPLACE_OPTIONS,
                Level::Error,
                offset,
                end - offset,
            );
        }
        self.close_replacement(node);
        Some(self.finish(node))
    }

    /// Expect `}`, skipping anything before it on the line, and return to text mode
    fn close_replacement(&mut self, node: NodeId) {
        if !self.accept(TokenKind::CurlyR) {
            self.mark_error(node, rules::RIGHT_CURLY_EXPECTED);
            while !self.at_line_end() && !self.peek(TokenKind::CurlyR) {
                self.consume_token();
            }
            self.accept(TokenKind::CurlyR);
        }
        self.switch_mode(ScanMode::Text);
    }
}

#[cfg(test)]
mod tests {
    use crate::choicescript::ast::{CaseFold, NodeKind, SyntaxTree};
    use crate::choicescript::parsing::{parse_scene, ParseOptions};

    fn parse(source: &str) -> SyntaxTree {
        parse_scene(source, None, ParseOptions::default())
    }

    fn find(tree: &SyntaxTree, name: &str) -> Vec<String> {
        tree.ids()
            .filter(|id| tree.kind(*id).name() == name)
            .map(|id| tree.text(id).to_string())
            .collect()
    }

    #[test]
    fn test_words_and_replacement() {
        let tree = parse("You won't see ${name} again.");
        assert_eq!(find(&tree, "RealWord"), vec!["You", "won't", "see", "again"]);
        assert_eq!(find(&tree, "VariableReplacement"), vec!["${name}"]);
        assert_eq!(find(&tree, "Variable"), vec!["name"]);
        assert!(tree.collect_issues(tree.root()).is_empty());
    }

    #[test]
    fn test_case_folding_replacements() {
        let tree = parse("$!{name} and $!!{title}");
        let folds: Vec<_> = tree
            .ids()
            .filter_map(|id| match tree.kind(id) {
                NodeKind::VariableReplacement { case_fold } => Some(*case_fold),
                _ => None,
            })
            .collect();
        assert_eq!(folds, vec![CaseFold::Capitalize, CaseFold::Upper]);
    }

    #[test]
    fn test_dollar_without_brace_is_text() {
        let tree = parse("It costs $ 5.");
        assert!(find(&tree, "VariableReplacement").is_empty());
        assert!(tree.collect_issues(tree.root()).is_empty());
    }

    #[test]
    fn test_multireplace() {
        let tree = parse("You are @{strong mighty|weak} today.");
        assert_eq!(find(&tree, "MultiReplace"), vec!["@{strong mighty|weak}"]);
        assert_eq!(find(&tree, "MultiReplaceOption"), vec!["mighty", "weak"]);
        assert_eq!(find(&tree, "Variable"), vec!["strong"]);
        assert_eq!(
            find(&tree, "RealWord"),
            vec!["You", "are", "mighty", "weak", "today"]
        );
    }

    #[test]
    fn test_multireplace_needs_two_options() {
        let tree = parse("@{strong mighty}");
        let ids: Vec<_> = tree
            .collect_issues(tree.root())
            .iter()
            .map(|m| m.rule().id)
            .collect();
        assert_eq!(ids, vec!["not-enough-multireplace-options"]);
    }

    #[test]
    fn test_unclosed_replacement() {
        let tree = parse("Hello ${name");
        let issues = tree.collect_issues(tree.root());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule().id, "right-curly-expected");
    }
}
