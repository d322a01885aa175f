//! Command and keyword tables
//!
//! Pure data consulted by the parser. Ordinary and flow commands are two disjoint sets; a
//! name found in neither is an unknown command. All tables are static references built once
//! with `once_cell::sync::Lazy`.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Commands that do not transfer control
pub static COMMANDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "achieve",
        "achievement",
        "advertisement",
        "allow_reuse",
        "author",
        "bug",
        "check_achievements",
        "check_purchase",
        "check_registration",
        "choice",
        "comment",
        "config",
        "create",
        "delay_break",
        "delay_ending",
        "disable_reuse",
        "else",
        "elseif",
        "elsif",
        "end_trial",
        "fake_choice",
        "feedback",
        "hide_reuse",
        "if",
        "ifid",
        "image",
        "input_number",
        "input_text",
        "label",
        "line_break",
        "link",
        "link_button",
        "login",
        "looplimit",
        "more_games",
        "page_break",
        "params",
        "print",
        "product",
        "purchase",
        "purchase_discount",
        "rand",
        "reset",
        "restore_checkpoint",
        "restore_game",
        "restore_purchases",
        "save_checkpoint",
        "save_game",
        "scene_list",
        "script",
        "selectable_if",
        "set",
        "setref",
        "share_this_game",
        "show_password",
        "sound",
        "stat_chart",
        "subscribe",
        "temp",
        "text_image",
        "title",
        "youtube",
    ]
    .into_iter()
    .collect()
});

/// Control transfer commands
pub static FLOW_COMMANDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "ending",
        "finish",
        "gosub",
        "gosub_scene",
        "goto",
        "goto_random_scene",
        "goto_scene",
        "gotoref",
        "redirect_scene",
        "restart",
        "return",
    ]
    .into_iter()
    .collect()
});

/// Words that can never name a variable
pub static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "and",
        "or",
        "modulo",
        "true",
        "false",
        "not",
        "round",
        "length",
        "log",
        "timestamp",
    ]
    .into_iter()
    .collect()
});

/// Commands whose arguments are free prose
pub static PROSE_COMMANDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "author",
        "bug",
        "ending",
        "finish",
        "line_break",
        "page_break",
        "title",
    ]
    .into_iter()
    .collect()
});

/// Commands that may prefix a choice option on the same line
pub static OPTION_MODIFIERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["if", "selectable_if", "hide_reuse", "disable_reuse", "allow_reuse"]
        .into_iter()
        .collect()
});

/// Which table a command name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandClass {
    Ordinary,
    Flow,
    Unknown,
}

pub fn classify_command(name: &str) -> CommandClass {
    if COMMANDS.contains(name) {
        CommandClass::Ordinary
    } else if FLOW_COMMANDS.contains(name) {
        CommandClass::Flow
    } else {
        CommandClass::Unknown
    }
}

pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.contains(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_disjoint() {
        assert!(COMMANDS.is_disjoint(&FLOW_COMMANDS));
    }

    #[test]
    fn test_classify_command() {
        assert_eq!(classify_command("set"), CommandClass::Ordinary);
        assert_eq!(classify_command("goto_scene"), CommandClass::Flow);
        assert_eq!(classify_command("gotox"), CommandClass::Unknown);
        assert!(is_reserved("modulo"));
        assert!(!is_reserved("strength"));
    }
}
