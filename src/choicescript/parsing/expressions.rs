//! Expression grammar
//!
//!     One rule per precedence level, lowest first, each calling into the next:
//!
//!         boolean          and or                   Expression
//!         comparison       = != < > <= >=           Expression
//!         concatenation    &                        StringExpression
//!         additive         + -                      BinaryExpression
//!         multiplicative   * / modulo %             BinaryExpression
//!         fair math        %+ %-                    BinaryExpression
//!         term             literals, (expr), not(expr), round(expr)..., name[expr], {expr}, name
//!
//!     All levels are left associative. A single operand is returned as is, so `5` is a `Term`
//!     and only `5 + 1` produces a `BinaryExpression`.
//!
//!     An unclosed `(` or `[` is marked at the end of its line and the rest of the line is
//!     skipped.
//!
//!     Type inference
//!
//!         Types are computed bottom-up as nodes are finished. A binary node gets the result
//!         type of its operator's family unless an operand is missing, is malformed (an
//!         expression whose own type is unknown) or has a definite type the operator does not
//!         take, in which case it is unknown. Variable references carry no type but are not
//!         malformed, so `5 * num` is a number.

use super::commands::is_reserved;
use super::parser::Parser;
use super::rules;
use crate::choicescript::ast::{
    CsType, Function, NodeId, NodeKind, OperatorFamily, OperatorKind, SyntaxTree, TermForm,
};
use crate::choicescript::scanning::TokenKind;

type OperandRule = fn(&mut Parser) -> Option<NodeId>;
type OperatorPeek = fn(&Parser) -> Option<OperatorKind>;

impl Parser {
    pub(super) fn parse_expression(&mut self) -> Option<NodeId> {
        self.parse_boolean()
    }

    fn parse_boolean(&mut self) -> Option<NodeId> {
        self.parse_binary(Parser::parse_comparison, Parser::peek_boolean_operator)
    }

    fn parse_comparison(&mut self) -> Option<NodeId> {
        self.parse_binary(Parser::parse_concatenation, Parser::peek_comparison_operator)
    }

    fn parse_concatenation(&mut self) -> Option<NodeId> {
        self.parse_binary(Parser::parse_additive, Parser::peek_concat_operator)
    }

    fn parse_additive(&mut self) -> Option<NodeId> {
        self.parse_binary(Parser::parse_multiplicative, Parser::peek_additive_operator)
    }

    fn parse_multiplicative(&mut self) -> Option<NodeId> {
        self.parse_binary(Parser::parse_fair_math, Parser::peek_multiplicative_operator)
    }

    fn parse_fair_math(&mut self) -> Option<NodeId> {
        self.parse_binary(Parser::parse_term, Parser::peek_fair_math_operator)
    }

    fn parse_binary(&mut self, operand: OperandRule, operator: OperatorPeek) -> Option<NodeId> {
        let mut left = operand(self)?;
        while let Some(op) = operator(self) {
            let offset = self.tree.node(left).offset;
            let node = self.tree.create(expression_kind(op, CsType::Unknown), offset);
            self.adopt(node, left);
            let op_node = self.parse_operator(op);
            self.adopt(node, op_node);

            let right = operand(self);
            match right {
                Some(right) => self.adopt(node, right),
                None => self.mark_error(node, rules::TERM_EXPECTED),
            }
            let cs_type = infer_type(&self.tree, op, Some(left), right);
            *self.tree.kind_mut(node) = expression_kind(op, cs_type);
            self.finish(node);
            left = node;
        }
        Some(left)
    }

    fn parse_operator(&mut self, op: OperatorKind) -> NodeId {
        let node = self.leaf(NodeKind::Operator {
            op,
            cs_type: op.result_type(),
        });
        if op == OperatorKind::DeprecatedModulo {
            let (offset, length) = {
                let node = self.tree.node(node);
                (node.offset, node.length)
            };
            let level = self.options.deprecated_modulo;
            self.add_marker(node, rules::DEPRECATED_MODULO, level, offset, length);
        }
        node
    }

    /// `*set name + 1`: the operator applies to the set target
    pub(super) fn parse_implicit_operation(
        &mut self,
        target: NodeId,
        op: OperatorKind,
    ) -> Option<NodeId> {
        let node = self.create_node(expression_kind(op, CsType::Unknown));
        let op_node = self.parse_operator(op);
        self.adopt(node, op_node);

        let right = self.parse_expression();
        match right {
            Some(right) => self.adopt(node, right),
            None => self.mark_error(node, rules::TERM_EXPECTED),
        }
        let cs_type = infer_type(&self.tree, op, Some(target), right);
        *self.tree.kind_mut(node) = expression_kind(op, cs_type);
        Some(self.finish(node))
    }

    // ---- operators ----

    fn peek_boolean_operator(&self) -> Option<OperatorKind> {
        if self.peek_keyword("and") {
            Some(OperatorKind::And)
        } else if self.peek_keyword("or") {
            Some(OperatorKind::Or)
        } else {
            None
        }
    }

    fn peek_comparison_operator(&self) -> Option<OperatorKind> {
        match self.token.kind {
            TokenKind::Delim('=') => Some(OperatorKind::Equal),
            TokenKind::NotEq => Some(OperatorKind::NotEqual),
            TokenKind::Delim('<') => Some(OperatorKind::Less),
            TokenKind::Delim('>') => Some(OperatorKind::Greater),
            TokenKind::LessEq => Some(OperatorKind::LessEqual),
            TokenKind::GreaterEq => Some(OperatorKind::GreaterEqual),
            _ => None,
        }
    }

    fn peek_concat_operator(&self) -> Option<OperatorKind> {
        self.peek_delim('&').then_some(OperatorKind::Concat)
    }

    fn peek_additive_operator(&self) -> Option<OperatorKind> {
        match self.token.kind {
            TokenKind::Delim('+') => Some(OperatorKind::Add),
            TokenKind::Delim('-') => Some(OperatorKind::Subtract),
            _ => None,
        }
    }

    fn peek_multiplicative_operator(&self) -> Option<OperatorKind> {
        match self.token.kind {
            TokenKind::Asterisk => Some(OperatorKind::Multiply),
            TokenKind::Delim('/') => Some(OperatorKind::Divide),
            TokenKind::Delim('%') => Some(OperatorKind::DeprecatedModulo),
            TokenKind::Ident if self.token.text == "modulo" => Some(OperatorKind::Modulo),
            _ => None,
        }
    }

    fn peek_fair_math_operator(&self) -> Option<OperatorKind> {
        match self.token.kind {
            TokenKind::FairMathAdd => Some(OperatorKind::FairAdd),
            TokenKind::FairMathSub => Some(OperatorKind::FairSubtract),
            _ => None,
        }
    }

    /// Operators that may open the value of a `*set`
    pub(super) fn peek_assignment_operator(&self) -> Option<OperatorKind> {
        self.peek_concat_operator()
            .or_else(|| self.peek_additive_operator())
            .or_else(|| self.peek_multiplicative_operator())
            .or_else(|| self.peek_fair_math_operator())
    }

    // ---- terms ----

    pub(super) fn parse_term(&mut self) -> Option<NodeId> {
        match self.token.kind {
            TokenKind::Num => Some(self.literal_term(NodeKind::NumericValue, CsType::Number)),
            TokenKind::String | TokenKind::BadString => {
                let term = self.create_node(NodeKind::Term {
                    cs_type: CsType::String,
                    form: TermForm::Literal,
                });
                let value = self.parse_string_value();
                self.adopt(term, value);
                Some(self.finish(term))
            }
            TokenKind::ParenL => Some(self.parse_group()),
            TokenKind::CurlyL => Some(self.parse_computed_reference()),
            TokenKind::Ident => self.parse_identifier_term(),
            _ => None,
        }
    }

    fn literal_term(&mut self, literal: NodeKind, cs_type: CsType) -> NodeId {
        let term = self.create_node(NodeKind::Term {
            cs_type,
            form: TermForm::Literal,
        });
        let value = self.leaf(literal);
        self.adopt(term, value);
        self.finish(term)
    }

    fn parse_identifier_term(&mut self) -> Option<NodeId> {
        match self.token.text.as_str() {
            "true" => return Some(self.literal_term(NodeKind::Boolean(true), CsType::Boolean)),
            "false" => return Some(self.literal_term(NodeKind::Boolean(false), CsType::Boolean)),
            _ => {}
        }
        if let Some(function) = Function::from_name(&self.token.text) {
            return self.parse_call(function);
        }
        if is_reserved(&self.token.text) {
            return None;
        }

        let term = self.create_node(NodeKind::Term {
            cs_type: CsType::Unknown,
            form: TermForm::Variable,
        });
        let variable = self.leaf(NodeKind::Variable);
        self.adopt(term, variable);

        if self.peek(TokenKind::BracketL) && self.is_adjacent() {
            *self.tree.kind_mut(term) = NodeKind::Term {
                cs_type: CsType::Unknown,
                form: TermForm::ArrayIndex,
            };
            while self.peek(TokenKind::BracketL) && self.is_adjacent() {
                self.consume_token();
                match self.parse_expression() {
                    Some(index) => self.adopt(term, index),
                    None => self.mark_error(term, rules::EXPRESSION_EXPECTED),
                }
                if !self.expect_closing(term, TokenKind::BracketR, rules::RIGHT_BRACKET_EXPECTED) {
                    break;
                }
            }
        }
        Some(self.finish(term))
    }

    /// `not(expr)`, `round(expr)`... Backtracks when no `(` follows the name.
    fn parse_call(&mut self, function: Function) -> Option<NodeId> {
        let mark = self.mark();
        let term = self.create_node(NodeKind::Term {
            cs_type: CsType::Unknown,
            form: TermForm::Call(function),
        });
        self.consume_token();
        if !self.accept(TokenKind::ParenL) {
            self.restore(mark);
            return None;
        }

        let argument = self.parse_expression();
        match argument {
            Some(argument) => self.adopt(term, argument),
            None => self.mark_error(term, rules::EXPRESSION_EXPECTED),
        }
        self.expect_closing(term, TokenKind::ParenR, rules::RIGHT_PARENTHESIS_EXPECTED);

        let cs_type = match argument.map(|id| classify_operand(&self.tree, id)) {
            Some(Operand::Untyped) | Some(Operand::Typed(_)) => function.result_type(),
            _ => CsType::Unknown,
        };
        *self.tree.kind_mut(term) = NodeKind::Term {
            cs_type,
            form: TermForm::Call(function),
        };
        Some(self.finish(term))
    }

    fn parse_group(&mut self) -> NodeId {
        let term = self.create_node(NodeKind::Term {
            cs_type: CsType::Unknown,
            form: TermForm::Group,
        });
        self.consume_token();

        let inner = self.parse_expression();
        match inner {
            Some(inner) => self.adopt(term, inner),
            None => self.mark_error(term, rules::EXPRESSION_EXPECTED),
        }
        self.expect_closing(term, TokenKind::ParenR, rules::RIGHT_PARENTHESIS_EXPECTED);

        let cs_type = inner
            .and_then(|inner| self.tree.kind(inner).cs_type())
            .unwrap_or(CsType::Unknown);
        *self.tree.kind_mut(term) = NodeKind::Term {
            cs_type,
            form: TermForm::Group,
        };
        self.finish(term)
    }

    fn parse_computed_reference(&mut self) -> NodeId {
        let term = self.create_node(NodeKind::Term {
            cs_type: CsType::Unknown,
            form: TermForm::ComputedReference,
        });
        self.consume_token();
        match self.parse_expression() {
            Some(inner) => self.adopt(term, inner),
            None => self.mark_error(term, rules::EXPRESSION_EXPECTED),
        }
        if !self.accept(TokenKind::CurlyR) {
            self.mark_error(term, rules::RIGHT_CURLY_EXPECTED);
        }
        self.finish(term)
    }

    /// Target of `*set`: a variable, `name[index]` or `{expr}`
    pub(super) fn parse_set_target(&mut self) -> Option<NodeId> {
        match self.token.kind {
            TokenKind::CurlyL => Some(self.parse_computed_reference()),
            TokenKind::Ident if !is_reserved(&self.token.text) => {
                let mark = self.mark();
                let variable = self.parse_variable_name()?;
                if self.peek(TokenKind::BracketL) && self.is_adjacent() {
                    self.restore(mark);
                    return self.parse_identifier_term();
                }
                Some(variable)
            }
            _ => None,
        }
    }
}

fn expression_kind(op: OperatorKind, cs_type: CsType) -> NodeKind {
    match op.family() {
        OperatorFamily::Boolean | OperatorFamily::Comparison => NodeKind::Expression { cs_type },
        OperatorFamily::Concatenation => NodeKind::StringExpression { cs_type },
        OperatorFamily::Arithmetic | OperatorFamily::FairMath => {
            NodeKind::BinaryExpression { cs_type }
        }
    }
}

/// How an operand contributes to the type of the expression using it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operand {
    /// A variable reference, whose type is not known at parse time
    Untyped,
    Typed(CsType),
    /// An expression that could not be typed
    Malformed,
}

pub(crate) fn classify_operand(tree: &SyntaxTree, id: NodeId) -> Operand {
    match tree.kind(id) {
        NodeKind::Variable => Operand::Untyped,
        NodeKind::Term {
            form: TermForm::Variable | TermForm::ArrayIndex | TermForm::ComputedReference,
            ..
        } => Operand::Untyped,
        NodeKind::Term {
            form: TermForm::Group,
            ..
        } => tree
            .children(id)
            .first()
            .map_or(Operand::Malformed, |inner| classify_operand(tree, *inner)),
        kind => match kind.cs_type() {
            Some(CsType::Unknown) | None => Operand::Malformed,
            Some(cs_type) => Operand::Typed(cs_type),
        },
    }
}

/// Result type of `left op right`
pub(crate) fn infer_type(
    tree: &SyntaxTree,
    op: OperatorKind,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> CsType {
    let mut typed = Vec::with_capacity(2);
    for operand in [left, right] {
        match operand.map(|id| classify_operand(tree, id)) {
            None | Some(Operand::Malformed) => return CsType::Unknown,
            Some(Operand::Untyped) => {}
            Some(Operand::Typed(cs_type)) => {
                if !op.accepts(cs_type) {
                    return CsType::Unknown;
                }
                typed.push(cs_type);
            }
        }
    }
    if op.family() == OperatorFamily::Comparison && typed.len() == 2 && typed[0] != typed[1] {
        return CsType::Unknown;
    }
    op.result_type()
}
