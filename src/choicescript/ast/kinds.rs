//! Node kinds
//!
//! Every node in a [SyntaxTree](super::node::SyntaxTree) shares one envelope (span, parent,
//! children, issues, side data) and carries a [NodeKind] describing what it is. The kinds are
//! a closed set grouped in families:
//!
//!     Literals        NumericValue, StringValue, StringLiteral, Boolean, HexColorValue
//!     Expressions     Expression, BinaryExpression, StringExpression, Term, Operator
//!     Declarations    VariableDeclaration, LabelDeclaration, Variable, Label
//!     Commands        Command, StandardCommand, FlowCommand, SetCommand, RandCommand,
//!                     ChoiceCommand, ChoiceOption
//!     Text            TextLine, RealWord, VariableReplacement, MultiReplace, MultiReplaceOption
//!     Structure       Scene, SceneRef, LabelRef, Line, Indentation
//!
//! Expression-family kinds carry an inferred [CsType]. `Unknown` is a first class value: it is
//! what an expression gets when its type cannot be decided, never a guess.

use crate::choicescript::scanning::{IndentUnit, LineType};
use serde::Serialize;
use std::fmt;

/// Primitive value types of the script language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CsType {
    Number,
    String,
    Boolean,
    Unknown,
}

impl CsType {
    pub fn is_known(self) -> bool {
        self != CsType::Unknown
    }
}

impl fmt::Display for CsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsType::Number => write!(f, "number"),
            CsType::String => write!(f, "string"),
            CsType::Boolean => write!(f, "boolean"),
            CsType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Operator families; each decides the result type of the expression it heads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OperatorFamily {
    Boolean,
    Comparison,
    Concatenation,
    Arithmetic,
    FairMath,
}

/// Every operator the expression grammar knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OperatorKind {
    And,
    Or,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Concat,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    /// The lone `%`, an older spelling of `modulo`
    DeprecatedModulo,
    FairAdd,
    FairSubtract,
}

impl OperatorKind {
    pub fn family(self) -> OperatorFamily {
        use OperatorKind::*;
        match self {
            And | Or => OperatorFamily::Boolean,
            Equal | NotEqual | Less | Greater | LessEqual | GreaterEqual => {
                OperatorFamily::Comparison
            }
            Concat => OperatorFamily::Concatenation,
            Add | Subtract | Multiply | Divide | Modulo | DeprecatedModulo => {
                OperatorFamily::Arithmetic
            }
            FairAdd | FairSubtract => OperatorFamily::FairMath,
        }
    }

    /// Type produced by an expression headed by this operator
    pub fn result_type(self) -> CsType {
        match self.family() {
            OperatorFamily::Boolean | OperatorFamily::Comparison => CsType::Boolean,
            OperatorFamily::Concatenation => CsType::String,
            OperatorFamily::Arithmetic | OperatorFamily::FairMath => CsType::Number,
        }
    }

    /// Whether an operand of a definite type is acceptable
    pub fn accepts(self, operand: CsType) -> bool {
        match self {
            OperatorKind::And | OperatorKind::Or => operand == CsType::Boolean,
            OperatorKind::Equal | OperatorKind::NotEqual => true,
            OperatorKind::Less
            | OperatorKind::Greater
            | OperatorKind::LessEqual
            | OperatorKind::GreaterEqual => operand == CsType::Number,
            // `&` stringifies whatever it is given
            OperatorKind::Concat => true,
            _ => operand == CsType::Number,
        }
    }

    pub fn symbol(self) -> &'static str {
        use OperatorKind::*;
        match self {
            And => "and",
            Or => "or",
            Equal => "=",
            NotEqual => "!=",
            Less => "<",
            Greater => ">",
            LessEqual => "<=",
            GreaterEqual => ">=",
            Concat => "&",
            Add => "+",
            Subtract => "-",
            Multiply => "*",
            Divide => "/",
            Modulo => "modulo",
            DeprecatedModulo => "%",
            FairAdd => "%+",
            FairSubtract => "%-",
        }
    }
}

/// Built-in functions usable as terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Function {
    Not,
    Round,
    Length,
    Log,
    Timestamp,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Function> {
        match name {
            "not" => Some(Function::Not),
            "round" => Some(Function::Round),
            "length" => Some(Function::Length),
            "log" => Some(Function::Log),
            "timestamp" => Some(Function::Timestamp),
            _ => None,
        }
    }

    pub fn result_type(self) -> CsType {
        match self {
            Function::Not => CsType::Boolean,
            _ => CsType::Number,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Not => "not",
            Function::Round => "round",
            Function::Length => "length",
            Function::Log => "log",
            Function::Timestamp => "timestamp",
        }
    }
}

/// Shape of a single operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TermForm {
    Literal,
    Variable,
    /// `name[expr]`
    ArrayIndex,
    /// `{expr}`
    ComputedReference,
    /// `(expr)`
    Group,
    Call(Function),
}

/// How a variable declaration binds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    /// `*temp`: scene local, bound in the innermost scope
    Temp,
    /// `*create`: persistent, bound in the scene's root scope
    Create,
}

/// Case folding of a `${}` replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CaseFold {
    /// `${...}`
    None,
    /// `$!{...}`
    Capitalize,
    /// `$!!{...}`
    Upper,
}

/// Reuse modifier on a choice option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Reuse {
    Hide,
    Disable,
    Allow,
}

/// What a node is
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    // Structure
    Scene { name: Option<String>, uri: Option<String> },
    Line { number: usize, indent: usize, line_type: LineType },
    Indentation { depth: usize, unit: IndentUnit },
    SceneRef,
    LabelRef,

    // Literals
    NumericValue,
    /// Quoted string
    StringValue,
    /// Unquoted command argument
    StringLiteral,
    Boolean(bool),
    HexColorValue,

    // Expressions
    Expression { cs_type: CsType },
    BinaryExpression { cs_type: CsType },
    StringExpression { cs_type: CsType },
    Term { cs_type: CsType, form: TermForm },
    Operator { op: OperatorKind, cs_type: CsType },

    // Declarations
    VariableDeclaration { kind: DeclarationKind },
    LabelDeclaration,
    Variable,
    Label,

    // Commands
    /// A command whose name is not known
    Command { name: String },
    StandardCommand { name: String },
    FlowCommand { name: String },
    SetCommand { by_reference: bool },
    RandCommand,
    ChoiceCommand { fake: bool },
    ChoiceOption { reuse: Option<Reuse>, conditional: bool },

    // Text
    TextLine,
    RealWord,
    Comment,
    VariableReplacement { case_fold: CaseFold },
    MultiReplace,
    MultiReplaceOption,
}

impl NodeKind {
    /// Kind name without payload
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Scene { .. } => "Scene",
            NodeKind::Line { .. } => "Line",
            NodeKind::Indentation { .. } => "Indentation",
            NodeKind::SceneRef => "SceneRef",
            NodeKind::LabelRef => "LabelRef",
            NodeKind::NumericValue => "NumericValue",
            NodeKind::StringValue => "StringValue",
            NodeKind::StringLiteral => "StringLiteral",
            NodeKind::Boolean(_) => "Boolean",
            NodeKind::HexColorValue => "HexColorValue",
            NodeKind::Expression { .. } => "Expression",
            NodeKind::BinaryExpression { .. } => "BinaryExpression",
            NodeKind::StringExpression { .. } => "StringExpression",
            NodeKind::Term { .. } => "Term",
            NodeKind::Operator { .. } => "Operator",
            NodeKind::VariableDeclaration { .. } => "VariableDeclaration",
            NodeKind::LabelDeclaration => "LabelDeclaration",
            NodeKind::Variable => "Variable",
            NodeKind::Label => "Label",
            NodeKind::Command { .. } => "Command",
            NodeKind::StandardCommand { .. } => "StandardCommand",
            NodeKind::FlowCommand { .. } => "FlowCommand",
            NodeKind::SetCommand { .. } => "SetCommand",
            NodeKind::RandCommand => "RandCommand",
            NodeKind::ChoiceCommand { .. } => "ChoiceCommand",
            NodeKind::ChoiceOption { .. } => "ChoiceOption",
            NodeKind::TextLine => "TextLine",
            NodeKind::RealWord => "RealWord",
            NodeKind::Comment => "Comment",
            NodeKind::VariableReplacement { .. } => "VariableReplacement",
            NodeKind::MultiReplace => "MultiReplace",
            NodeKind::MultiReplaceOption => "MultiReplaceOption",
        }
    }

    /// Inferred type of expression-family nodes, `None` for everything else
    pub fn cs_type(&self) -> Option<CsType> {
        match self {
            NodeKind::Expression { cs_type }
            | NodeKind::BinaryExpression { cs_type }
            | NodeKind::StringExpression { cs_type }
            | NodeKind::Term { cs_type, .. }
            | NodeKind::Operator { cs_type, .. } => Some(*cs_type),
            NodeKind::NumericValue => Some(CsType::Number),
            NodeKind::StringValue => Some(CsType::String),
            NodeKind::Boolean(_) => Some(CsType::Boolean),
            _ => None,
        }
    }

    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            NodeKind::Expression { .. }
                | NodeKind::BinaryExpression { .. }
                | NodeKind::StringExpression { .. }
                | NodeKind::Term { .. }
        )
    }

    /// Name of the command for command-family nodes
    pub fn command_name(&self) -> Option<&str> {
        match self {
            NodeKind::Command { name }
            | NodeKind::StandardCommand { name }
            | NodeKind::FlowCommand { name } => Some(name),
            NodeKind::SetCommand { by_reference } => {
                Some(if *by_reference { "setref" } else { "set" })
            }
            NodeKind::RandCommand => Some("rand"),
            NodeKind::ChoiceCommand { fake } => Some(if *fake { "fake_choice" } else { "choice" }),
            NodeKind::VariableDeclaration { kind } => Some(match kind {
                DeclarationKind::Temp => "temp",
                DeclarationKind::Create => "create",
            }),
            NodeKind::LabelDeclaration => Some("label"),
            _ => None,
        }
    }

    /// Short payload description for tree dumps
    pub fn detail(&self) -> Option<String> {
        match self {
            NodeKind::Scene { name, .. } => name.clone(),
            NodeKind::Line { number, indent, line_type } => {
                Some(format!("#{number} {line_type:?} indent={indent}"))
            }
            NodeKind::Indentation { depth, unit } => Some(format!("{depth} {unit:?}")),
            NodeKind::Boolean(value) => Some(value.to_string()),
            NodeKind::Operator { op, .. } => Some(op.symbol().to_string()),
            NodeKind::Term { cs_type, form } => Some(format!("{form:?} {cs_type}")),
            NodeKind::ChoiceOption { reuse, conditional } => match (reuse, conditional) {
                (None, false) => None,
                (reuse, conditional) => Some(format!("reuse={reuse:?} conditional={conditional}")),
            },
            NodeKind::VariableReplacement { case_fold } => Some(format!("{case_fold:?}")),
            other => match other.cs_type() {
                Some(cs_type) if other.is_expression() => Some(cs_type.to_string()),
                _ => other.command_name().map(str::to_string),
            },
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail() {
            Some(detail) => write!(f, "{}({})", self.name(), detail),
            None => write!(f, "{}", self.name()),
        }
    }
}
