//! Command grammars
//!
//! One rule per command family. Each rule is entered with the lookahead on the command name
//! (the `*` already consumed) and the offset of the `*`, creates its node at that offset and
//! returns with the lookahead on the line end.
//!
//!     *temp name [expr]           VariableDeclaration(Temp)
//!     *create name expr           VariableDeclaration(Create)
//!     *set target [op] expr       SetCommand
//!     *setref expr expr           SetCommand(by reference)
//!     *rand name min max          RandCommand
//!     *label name                 LabelDeclaration
//!     *goto label                 FlowCommand > LabelRef > Label
//!     *goto_scene scene [label]   FlowCommand > (SceneRef | LabelRef > SceneRef, Label)
//!     *print expr                 StandardCommand > expression (also *looplimit)
//!     *if expr / *else            StandardCommand owning an indented body
//!     *choice                     ChoiceCommand owning option lines
//!     *scene_list                 StandardCommand owning one SceneRef per line
//!
//! Every other known command takes whitespace separated arguments (or prose, for the
//! commands in `PROSE_COMMANDS`).

use super::commands::{classify_command, is_reserved, CommandClass, OPTION_MODIFIERS, PROSE_COMMANDS};
use super::parser::{BlockContext, Parser, Statement};
use super::rules;
use crate::choicescript::ast::{DeclarationKind, Level, NodeId, NodeKind, Reuse};
use crate::choicescript::scanning::{ScanMode, TokenKind};
use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER_ARGUMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?([0-9]+(\.[0-9]*)?|\.[0-9]+)$").unwrap());
static HEX_COLOR_ARGUMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap());

impl Parser {
    /// Parse a command line. The lookahead is the leading `*`.
    pub(super) fn parse_command(&mut self, context: BlockContext) -> Statement {
        if let Some(option) = self.parse_option_with_modifiers(context) {
            return option;
        }

        let start = self.token.offset;
        self.consume_token();
        let name = self.token.text.clone();

        match name.as_str() {
            "temp" => self.parse_variable_declaration(start, DeclarationKind::Temp),
            "create" => self.parse_variable_declaration(start, DeclarationKind::Create),
            "set" => self.parse_set(start, false),
            "setref" => self.parse_set(start, true),
            "rand" => self.parse_rand(start),
            "label" => self.parse_label_declaration(start),
            "goto" | "gosub" => self.parse_goto(start, name),
            "goto_scene" | "gosub_scene" | "redirect_scene" => self.parse_goto_scene(start, name),
            "gotoref" => self.parse_gotoref(start),
            "print" | "looplimit" => self.parse_expression_command(start, name),
            "input_text" | "input_number" => self.parse_input(start, name),
            "params" => self.parse_params(start),
            "if" | "elseif" | "elsif" => self.parse_conditional(start, name, context),
            "else" => self.parse_else(start, context),
            "choice" => self.parse_choice(start, false),
            "fake_choice" => self.parse_choice(start, true),
            "scene_list" => self.parse_scene_list(start),
            "stat_chart" | "achievement" => self.parse_prose_block_command(start, name),
            _ => self.parse_generic_command(start, name),
        }
    }

    /// Consume the command name and return the finished node
    fn command_node(&mut self, kind: NodeKind, start: usize) -> NodeId {
        let node = self.tree.create(kind, start);
        self.consume_token();
        self.finish(node)
    }

    pub(super) fn parse_variable_name(&mut self) -> Option<NodeId> {
        if self.token.kind == TokenKind::Ident && !is_reserved(&self.token.text) {
            return Some(self.leaf(NodeKind::Variable));
        }
        None
    }

    fn parse_variable_declaration(&mut self, start: usize, kind: DeclarationKind) -> Statement {
        let node = self.command_node(NodeKind::VariableDeclaration { kind }, start);

        let Some(variable) = self.parse_variable_name() else {
            return Statement::line(self.fail_line(node, rules::VARIABLE_NAME_EXPECTED));
        };
        self.adopt(node, variable);

        match self.parse_expression() {
            Some(value) => self.adopt(node, value),
            None if kind == DeclarationKind::Create || !self.at_line_end() => {
                return Statement::line(self.fail_line(node, rules::EXPRESSION_EXPECTED));
            }
            None => {}
        }
        Statement::line(self.expect_line_end(node))
    }

    fn parse_set(&mut self, start: usize, by_reference: bool) -> Statement {
        let node = self.command_node(NodeKind::SetCommand { by_reference }, start);

        let target = if by_reference {
            self.parse_expression()
        } else {
            self.parse_set_target()
        };
        let Some(target) = target else {
            let rule = if by_reference {
                rules::EXPRESSION_EXPECTED
            } else {
                rules::VARIABLE_NAME_EXPECTED
            };
            return Statement::line(self.fail_line(node, rule));
        };
        self.adopt(node, target);

        if self.at_line_end() {
            self.mark_error(node, rules::EXPRESSION_EXPECTED);
            return Statement::line(self.finish(node));
        }

        let value = match self.peek_assignment_operator() {
            Some(op) if !by_reference => self.parse_implicit_operation(target, op),
            _ => self.parse_expression(),
        };
        match value {
            Some(value) => self.adopt(node, value),
            None => return Statement::line(self.fail_line(node, rules::EXPRESSION_EXPECTED)),
        }
        Statement::line(self.expect_line_end(node))
    }

    fn parse_rand(&mut self, start: usize) -> Statement {
        let node = self.command_node(NodeKind::RandCommand, start);

        let Some(variable) = self.parse_variable_name() else {
            return Statement::line(self.fail_line(node, rules::VARIABLE_NAME_EXPECTED));
        };
        self.adopt(node, variable);

        for _ in 0..2 {
            match self.parse_expression() {
                Some(bound) => self.adopt(node, bound),
                None => return Statement::line(self.fail_line(node, rules::EXPRESSION_EXPECTED)),
            }
        }
        Statement::line(self.expect_line_end(node))
    }

    fn parse_label_declaration(&mut self, start: usize) -> Statement {
        let node = self.command_node(NodeKind::LabelDeclaration, start);
        if !self.rescan_unquoted() {
            return Statement::line(self.fail_line(node, rules::LABEL_NAME_EXPECTED));
        }
        let label = self.leaf(NodeKind::Label);
        self.adopt(node, label);
        Statement::line(self.expect_line_end(node))
    }

    fn parse_goto(&mut self, start: usize, name: String) -> Statement {
        let takes_arguments = name == "gosub";
        let node = self.command_node(NodeKind::FlowCommand { name }, start);

        if !self.rescan_unquoted() {
            return Statement::line(self.fail_line(node, rules::LABEL_NAME_EXPECTED));
        }
        let label_ref = self.create_node(NodeKind::LabelRef);
        let label = self.leaf(NodeKind::Label);
        self.adopt(label_ref, label);
        self.adopt(node, label_ref);

        if takes_arguments {
            self.parse_expression_arguments(node);
        }
        Statement::line(self.expect_line_end(node))
    }

    fn parse_goto_scene(&mut self, start: usize, name: String) -> Statement {
        let takes_arguments = name == "gosub_scene";
        let node = self.command_node(NodeKind::FlowCommand { name }, start);

        if !self.rescan_unquoted() {
            return Statement::line(self.fail_line(node, rules::SCENE_NAME_EXPECTED));
        }
        let scene_ref = self.leaf(NodeKind::SceneRef);

        if self.rescan_unquoted() {
            let offset = self.tree.node(scene_ref).offset;
            let label_ref = self.tree.create(NodeKind::LabelRef, offset);
            self.adopt(label_ref, scene_ref);
            let label = self.leaf(NodeKind::Label);
            self.adopt(label_ref, label);
            self.adopt(node, label_ref);
        } else {
            self.adopt(node, scene_ref);
        }

        if takes_arguments {
            self.parse_expression_arguments(node);
        }
        Statement::line(self.expect_line_end(node))
    }

    fn parse_gotoref(&mut self, start: usize) -> Statement {
        let node = self.command_node(
            NodeKind::FlowCommand {
                name: "gotoref".to_string(),
            },
            start,
        );
        match self.parse_expression() {
            Some(target) => self.adopt(node, target),
            None => return Statement::line(self.fail_line(node, rules::EXPRESSION_EXPECTED)),
        }
        Statement::line(self.expect_line_end(node))
    }

    fn parse_expression_command(&mut self, start: usize, name: String) -> Statement {
        let node = self.command_node(NodeKind::StandardCommand { name }, start);
        match self.parse_expression() {
            Some(value) => self.adopt(node, value),
            None => return Statement::line(self.fail_line(node, rules::EXPRESSION_EXPECTED)),
        }
        Statement::line(self.expect_line_end(node))
    }

    fn parse_input(&mut self, start: usize, name: String) -> Statement {
        let bounded = name == "input_number";
        let node = self.command_node(NodeKind::StandardCommand { name }, start);

        let Some(variable) = self.parse_variable_name() else {
            return Statement::line(self.fail_line(node, rules::VARIABLE_NAME_EXPECTED));
        };
        self.adopt(node, variable);

        if bounded {
            for _ in 0..2 {
                match self.parse_expression() {
                    Some(bound) => self.adopt(node, bound),
                    None => {
                        return Statement::line(self.fail_line(node, rules::EXPRESSION_EXPECTED))
                    }
                }
            }
        }
        Statement::line(self.expect_line_end(node))
    }

    fn parse_params(&mut self, start: usize) -> Statement {
        let node = self.command_node(
            NodeKind::StandardCommand {
                name: "params".to_string(),
            },
            start,
        );
        while !self.at_line_end() {
            match self.parse_variable_name() {
                Some(variable) => self.adopt(node, variable),
                None => return Statement::line(self.fail_line(node, rules::VARIABLE_NAME_EXPECTED)),
            }
        }
        Statement::line(self.finish(node))
    }

    fn parse_conditional(&mut self, start: usize, name: String, context: BlockContext) -> Statement {
        let node = self.command_node(NodeKind::StandardCommand { name }, start);
        match self.parse_expression() {
            Some(condition) => {
                self.adopt(node, condition);
                self.expect_line_end(node);
            }
            None => {
                self.fail_line(node, rules::EXPRESSION_EXPECTED);
            }
        }
        Statement::with_block(node, body_context(context))
    }

    fn parse_else(&mut self, start: usize, context: BlockContext) -> Statement {
        let node = self.command_node(
            NodeKind::StandardCommand {
                name: "else".to_string(),
            },
            start,
        );
        self.expect_line_end(node);
        Statement::with_block(node, body_context(context))
    }

    fn parse_choice(&mut self, start: usize, fake: bool) -> Statement {
        let node = self.command_node(NodeKind::ChoiceCommand { fake }, start);
        // multiple choice group names
        self.parse_literal_arguments(node);
        Statement::with_block(node, BlockContext::Choice)
    }

    fn parse_scene_list(&mut self, start: usize) -> Statement {
        let node = self.command_node(
            NodeKind::StandardCommand {
                name: "scene_list".to_string(),
            },
            start,
        );
        self.expect_line_end(node);
        Statement::with_block(node, BlockContext::SceneList)
    }

    fn parse_prose_block_command(&mut self, start: usize, name: String) -> Statement {
        let node = self.command_node(NodeKind::StandardCommand { name }, start);
        self.parse_literal_arguments(node);
        Statement::with_block(node, BlockContext::Prose)
    }

    fn parse_generic_command(&mut self, start: usize, name: String) -> Statement {
        let prose = PROSE_COMMANDS.contains(name.as_str());
        let kind = match classify_command(&name) {
            CommandClass::Ordinary => NodeKind::StandardCommand { name },
            CommandClass::Flow => NodeKind::FlowCommand { name },
            CommandClass::Unknown => {
                let node = self.tree.create(NodeKind::Command { name }, start);
                return Statement::line(self.fail_line(node, rules::UNKNOWN_COMMAND));
            }
        };
        let node = self.command_node(kind, start);

        if prose {
            self.switch_mode(ScanMode::Text);
            self.parse_text_content(node, &[]);
            return Statement::line(self.finish(node));
        }
        self.parse_literal_arguments(node);
        Statement::line(self.finish(node))
    }

    /// Arguments that are expressions (`*gosub label 1 "two" three`)
    fn parse_expression_arguments(&mut self, node: NodeId) {
        while !self.at_line_end() {
            match self.parse_expression() {
                Some(argument) => self.adopt(node, argument),
                None => {
                    self.expect_line_end(node);
                    return;
                }
            }
        }
    }

    /// Whitespace separated literal arguments up to the end of the line
    fn parse_literal_arguments(&mut self, node: NodeId) {
        while !self.at_line_end() {
            let argument = match self.token.kind {
                TokenKind::String | TokenKind::BadString => self.parse_string_value(),
                _ => {
                    if !self.rescan_unquoted() {
                        break;
                    }
                    let kind = if NUMBER_ARGUMENT.is_match(&self.token.text) {
                        NodeKind::NumericValue
                    } else if HEX_COLOR_ARGUMENT.is_match(&self.token.text) {
                        NodeKind::HexColorValue
                    } else {
                        NodeKind::StringLiteral
                    };
                    self.leaf(kind)
                }
            };
            self.adopt(node, argument);
        }
    }

    /// Quoted string literal, marking unterminated ones
    pub(super) fn parse_string_value(&mut self) -> NodeId {
        let unterminated = self.token.kind == TokenKind::BadString;
        let node = self.leaf(NodeKind::StringValue);
        if unterminated {
            let (offset, length) = {
                let node = self.tree.node(node);
                (node.offset, node.length)
            };
            self.add_marker(node, rules::MISSING_CLOSING_QUOTE, Level::Error, offset, length);
        }
        node
    }

    // ---- choices ----

    /// A plain `#Option` line
    pub(super) fn parse_choice_option(&mut self) -> Statement {
        let option = self.create_node(NodeKind::ChoiceOption {
            reuse: None,
            conditional: false,
        });
        self.parse_option_text(option);
        Statement::with_block(option, BlockContext::Body)
    }

    /// `*if (cond) #Option`, `*selectable_if (cond) #Option`, `*hide_reuse #Option`...
    ///
    /// Backtracks unless the modifiers are followed by `#` on the same line.
    fn parse_option_with_modifiers(&mut self, context: BlockContext) -> Option<Statement> {
        let mark = self.mark();
        let start = self.token.offset;
        let mut modifiers = Vec::new();
        let mut reuse = None;
        let mut conditional = false;

        while self.peek(TokenKind::Asterisk) {
            let modifier_start = self.token.offset;
            self.consume_token();
            if self.token.kind != TokenKind::Ident
                || !OPTION_MODIFIERS.contains(self.token.text.as_str())
            {
                self.restore(mark);
                return None;
            }
            let name = self.token.text.clone();
            let node = self.command_node(
                NodeKind::StandardCommand { name: name.clone() },
                modifier_start,
            );
            match name.as_str() {
                "hide_reuse" => reuse = Some(Reuse::Hide),
                "disable_reuse" => reuse = Some(Reuse::Disable),
                "allow_reuse" => reuse = Some(Reuse::Allow),
                _ => {
                    conditional = true;
                    let Some(condition) = self.parse_expression() else {
                        self.restore(mark);
                        return None;
                    };
                    self.adopt(node, condition);
                }
            }
            modifiers.push(node);
        }

        if !self.peek(TokenKind::Hash) {
            self.restore(mark);
            return None;
        }

        let option = self
            .tree
            .create(NodeKind::ChoiceOption { reuse, conditional }, start);
        for modifier in modifiers {
            self.adopt(option, modifier);
        }
        let hash = self.token.offset;
        self.parse_option_text(option);
        if context != BlockContext::Choice {
            self.add_marker(option, rules::OPTION_OUTSIDE_CHOICE, Level::Error, hash, 1);
        }
        Some(Statement::with_block(option, BlockContext::Body))
    }

    fn parse_option_text(&mut self, option: NodeId) {
        self.accept(TokenKind::Hash);
        self.switch_mode(ScanMode::Text);
        self.parse_text_content(option, &[]);
        self.finish(option);
    }

    // ---- scene lists ----

    pub(super) fn parse_scene_list_entry(&mut self) -> Statement {
        let start = self.token.offset;
        // `$` marks a purchasable scene
        self.accept(TokenKind::Dollar);
        if !self.rescan_unquoted() {
            let node = self.tree.create(NodeKind::SceneRef, start);
            return Statement::line(self.fail_line(node, rules::SCENE_NAME_EXPECTED));
        }
        let node = self.leaf(NodeKind::SceneRef);
        Statement::line(self.expect_line_end(node))
    }
}

fn body_context(context: BlockContext) -> BlockContext {
    match context {
        BlockContext::Choice => BlockContext::Choice,
        _ => BlockContext::Body,
    }
}

#[cfg(test)]
mod tests {
    use crate::choicescript::ast::{NodeId, NodeKind, SyntaxTree};
    use crate::choicescript::parsing::{parse_scene, ParseOptions};

    fn parse(source: &str) -> SyntaxTree {
        let tree = parse_scene(source, None, ParseOptions::default());
        assert!(
            tree.collect_issues(tree.root()).is_empty(),
            "unexpected markers in {source:?}"
        );
        tree
    }

    fn first(tree: &SyntaxTree, name: &str) -> NodeId {
        tree.ids()
            .find(|id| tree.kind(*id).name() == name)
            .unwrap_or_else(|| panic!("no {name} node"))
    }

    fn child_names(tree: &SyntaxTree, node: NodeId) -> Vec<&'static str> {
        tree.children(node)
            .iter()
            .map(|child| tree.kind(*child).name())
            .collect()
    }

    #[test]
    fn test_goto_scene_with_label() {
        let tree = parse("*goto_scene chapter2 start\n");
        let command = first(&tree, "FlowCommand");
        assert_eq!(child_names(&tree, command), vec!["LabelRef"]);

        let label_ref = tree.children(command)[0];
        let parts: Vec<_> = tree
            .children(label_ref)
            .iter()
            .map(|id| (tree.kind(*id).name(), tree.text(*id)))
            .collect();
        assert_eq!(parts, vec![("SceneRef", "chapter2"), ("Label", "start")]);
    }

    #[test]
    fn test_literal_arguments() {
        let tree = parse("*image cover.png #fff 12 \"alt text\"\n");
        let command = first(&tree, "StandardCommand");
        assert_eq!(
            child_names(&tree, command),
            vec!["StringLiteral", "HexColorValue", "NumericValue", "StringValue"]
        );
    }

    #[test]
    fn test_gosub_arguments() {
        let tree = parse("*gosub add 1 \"two\" three\n");
        let command = first(&tree, "FlowCommand");
        assert_eq!(
            child_names(&tree, command),
            vec!["LabelRef", "Term", "Term", "Term"]
        );
    }

    #[test]
    fn test_variable_commands() {
        let tree = parse("*input_number age 1 120\n*rand roll 1 6\n*params a b\n");
        let input = first(&tree, "StandardCommand");
        assert_eq!(child_names(&tree, input), vec!["Variable", "Term", "Term"]);
        let rand = first(&tree, "RandCommand");
        assert_eq!(child_names(&tree, rand), vec!["Variable", "Term", "Term"]);

        let params = tree
            .ids()
            .find(|id| tree.kind(*id).command_name() == Some("params"))
            .unwrap();
        assert_eq!(child_names(&tree, params), vec!["Variable", "Variable"]);
    }

    #[test]
    fn test_print_and_looplimit_take_expressions() {
        let tree = parse("*print name\n*looplimit limit + 1\n");
        let commands: Vec<_> = tree
            .ids()
            .filter(|id| tree.kind(*id).name() == "StandardCommand")
            .collect();
        assert_eq!(commands.len(), 2);
        assert_eq!(tree.kind(commands[0]).command_name(), Some("print"));
        assert_eq!(child_names(&tree, commands[0]), vec!["Term"]);

        let variables: Vec<_> = tree
            .ids()
            .filter(|id| *tree.kind(*id) == NodeKind::Variable)
            .map(|id| tree.text(id))
            .collect();
        assert_eq!(variables, vec!["name", "limit"]);
    }

    #[test]
    fn test_print_without_value_is_marked() {
        let tree = parse_scene("*print\n", None, ParseOptions::default());
        let issues = tree.collect_issues(tree.root());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule().id, "expression-expected");
    }

    #[test]
    fn test_setref() {
        let tree = parse("*setref \"var\" 3\n");
        let set = first(&tree, "SetCommand");
        assert_eq!(
            *tree.kind(set),
            NodeKind::SetCommand { by_reference: true }
        );
        assert_eq!(tree.children(set).len(), 2);
    }

    #[test]
    fn test_if_else_blocks() {
        let tree = parse("*if x\n  A\n*else\n  B\n");
        let commands: Vec<_> = tree
            .ids()
            .filter(|id| tree.kind(*id).name() == "StandardCommand")
            .collect();
        assert_eq!(commands.len(), 2);
        assert_eq!(child_names(&tree, commands[0]), vec!["Term", "Line"]);
        assert_eq!(child_names(&tree, commands[1]), vec!["Line"]);
        assert_eq!(tree.text(commands[1]), "*else\n  B");
    }

    #[test]
    fn test_prose_arguments() {
        let tree = parse("*page_break Next chapter\n");
        let command = first(&tree, "StandardCommand");
        assert_eq!(child_names(&tree, command), vec!["RealWord", "RealWord"]);
    }

    #[test]
    fn test_stat_chart_block_is_prose() {
        let tree = parse("*stat_chart\n  percent strength Strength\n");
        let command = first(&tree, "StandardCommand");
        let line = tree.children(command)[0];
        assert_eq!(child_names(&tree, line), vec!["Indentation", "TextLine"]);
    }

    #[test]
    fn test_fake_choice_options() {
        let tree = parse("*fake_choice\n  #A\n  #B\nAfter\n");
        let choice = first(&tree, "ChoiceCommand");
        assert_eq!(*tree.kind(choice), NodeKind::ChoiceCommand { fake: true });
        let options = tree
            .ids()
            .filter(|id| tree.encloses(choice, *id) && tree.kind(*id).name() == "ChoiceOption")
            .count();
        assert_eq!(options, 2);
    }

    #[test]
    fn test_modifier_without_option_is_a_command() {
        let tree = parse("*if alive\n  Still here.\n");
        let command = first(&tree, "StandardCommand");
        assert_eq!(tree.kind(command).command_name(), Some("if"));
        assert!(tree
            .ids()
            .all(|id| tree.kind(id).name() != "ChoiceOption"));
    }

    #[test]
    fn test_selectable_if_option() {
        let tree = parse("*choice\n  *selectable_if (gold > 1) #Pay\n    Paid.\n");
        let option = first(&tree, "ChoiceOption");
        assert_eq!(
            *tree.kind(option),
            NodeKind::ChoiceOption {
                reuse: None,
                conditional: true
            }
        );
        assert_eq!(
            child_names(&tree, option),
            vec!["StandardCommand", "RealWord", "Line"]
        );
    }
}
