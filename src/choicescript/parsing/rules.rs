//! Parse rules
//!
//! One [Rule] per kind of problem the parser reports. Ids are stable kebab-case strings that
//! tooling may match on; messages are the default marker text.

use crate::choicescript::ast::Rule;

pub const UNKNOWN_COMMAND: Rule = Rule::new("unknown-command", "Unknown command");
pub const VARIABLE_NAME_EXPECTED: Rule =
    Rule::new("variable-name-expected", "Variable name expected");
pub const LABEL_NAME_EXPECTED: Rule = Rule::new("label-name-expected", "Label name expected");
pub const SCENE_NAME_EXPECTED: Rule = Rule::new("scene-name-expected", "Scene name expected");
pub const EXPRESSION_EXPECTED: Rule = Rule::new("expression-expected", "Expression expected");
pub const TERM_EXPECTED: Rule = Rule::new("term-expected", "Term expected");
pub const RIGHT_PARENTHESIS_EXPECTED: Rule =
    Rule::new("right-parenthesis-expected", "')' expected");
pub const RIGHT_BRACKET_EXPECTED: Rule = Rule::new("right-bracket-expected", "']' expected");
pub const RIGHT_CURLY_EXPECTED: Rule = Rule::new("right-curly-expected", "'}' expected");
pub const MISSING_CLOSING_QUOTE: Rule =
    Rule::new("missing-closing-quote", "String is missing its closing quote");
pub const NOT_ENOUGH_MULTIREPLACE_OPTIONS: Rule = Rule::new(
    "not-enough-multireplace-options",
    "Multireplace needs at least two options separated by '|'",
);
pub const MIXED_INDENTATION: Rule =
    Rule::new("mixed-indentation", "Tabs and spaces are mixed in indentation");
pub const CHOICE_OPTION_EXPECTED: Rule =
    Rule::new("choice-option-expected", "Choice option ('#') expected");
pub const NO_CHOICE_OPTIONS: Rule = Rule::new("no-choice-options", "Choice has no options");
pub const OPTION_OUTSIDE_CHOICE: Rule = Rule::new(
    "option-outside-choice",
    "Option is not inside a *choice or *fake_choice",
);
pub const UNEXPECTED_TOKEN: Rule = Rule::new("unexpected-token", "Unexpected input");
pub const DEPRECATED_MODULO: Rule = Rule::new(
    "deprecated-modulo",
    "The '%' operator is deprecated, use 'modulo'",
);

/// Every rule the parser can report
pub const ALL: &[Rule] = &[
    UNKNOWN_COMMAND,
    VARIABLE_NAME_EXPECTED,
    LABEL_NAME_EXPECTED,
    SCENE_NAME_EXPECTED,
    EXPRESSION_EXPECTED,
    TERM_EXPECTED,
    RIGHT_PARENTHESIS_EXPECTED,
    RIGHT_BRACKET_EXPECTED,
    RIGHT_CURLY_EXPECTED,
    MISSING_CLOSING_QUOTE,
    NOT_ENOUGH_MULTIREPLACE_OPTIONS,
    MIXED_INDENTATION,
    CHOICE_OPTION_EXPECTED,
    NO_CHOICE_OPTIONS,
    OPTION_OUTSIDE_CHOICE,
    UNEXPECTED_TOKEN,
    DEPRECATED_MODULO,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rule_ids_are_unique() {
        let ids: HashSet<_> = ALL.iter().map(|rule| rule.id).collect();
        assert_eq!(ids.len(), ALL.len());
    }
}
