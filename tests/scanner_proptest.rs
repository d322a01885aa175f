//! Property-based tests for the scanner and parser
//!
//! Any input must scan into tokens that cover exactly their source text and end in EOF, and
//! must parse into a tree whose nodes contain their children and markers.

use choicescript::choicescript::ast::SourceLocation;
use choicescript::choicescript::parsing::{parse_scene, ParseOptions};
use choicescript::choicescript::scanning::{tokenize, TokenKind};
use choicescript::choicescript::scoping::build_scopes;
use proptest::prelude::*;

/// Lines that look like scene code, broken or not
fn scene_line_strategy() -> impl Strategy<Value = String> {
    let indent = prop_oneof!["", "  ", "    ", "\t", " \t"];
    let body = prop_oneof![
        "\\*(temp|create|set|label|goto|goto_scene|if|else|choice|finish) [a-z_]{0,8}",
        "\\*set [a-z]{1,6} [-+*/%&]? ?[0-9a-z\"(){}\\[\\] ]{0,16}",
        "#[A-Za-z !?]{0,16}",
        "[A-Za-z' ,.]{0,20}",
        "\\$!{0,2}\\{[a-z ]{0,6}\\}?",
        "@\\{[a-z]{0,5} [a-z|]{0,10}\\}?",
        "\\*comment .{0,10}",
        "\\*(if|selectable_if) \\([a-z]{1,4} [<>=] [0-9]\\) #[a-z ]{0,8}",
    ];
    (indent, body).prop_map(|(indent, body)| format!("{indent}{body}"))
}

fn scene_strategy() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(scene_line_strategy(), 0..12),
        prop_oneof!["\n", "\r\n"],
    )
        .prop_map(|(lines, newline)| lines.join(&newline))
}

fn any_source() -> impl Strategy<Value = String> {
    prop_oneof![scene_strategy(), "\\PC{0,64}", ".{0,64}"]
}

fn check_tokens(source: &str) {
    let tokens = tokenize(source);
    let location = SourceLocation::new(source);

    let last = tokens.last().unwrap();
    assert_eq!(last.kind, TokenKind::EOF);
    assert_eq!(last.offset, source.len());

    let mut previous_end = 0;
    for token in &tokens {
        assert_eq!(&source[token.offset..token.end()], token.text);
        assert!(token.offset >= previous_end, "tokens overlap at {}", token.offset);
        assert_eq!(location.position_to_byte(token.position), token.offset);
        previous_end = token.end();
    }
}

proptest! {
    #[test]
    fn tokens_round_trip_positions(source in any_source()) {
        check_tokens(&source);
    }

    #[test]
    fn parse_keeps_spans_nested(source in any_source()) {
        let mut tree = parse_scene(&source, Some("scene"), ParseOptions::default());
        let root = tree.node(tree.root());
        prop_assert_eq!(root.offset, 0);
        prop_assert_eq!(root.length, source.len());

        for id in tree.ids() {
            let node = tree.node(id);
            prop_assert!(node.end() <= source.len());
            for child in tree.children(id) {
                let child = tree.node(*child);
                prop_assert!(node.offset <= child.offset && child.end() <= node.end());
            }
            for marker in tree.issues(id) {
                prop_assert!(node.offset <= marker.offset() && marker.end() <= node.end());
            }
        }

        let scopes = build_scopes(&mut tree);
        prop_assert!(!scopes.is_empty());
    }
}

#[test]
fn degenerate_inputs_scan() {
    for source in ["", "\"", "'", "((((", "}}}", "*", "#", "\n\n", "\r", "\u{0}\u{7f}", "é*set"] {
        check_tokens(source);
        parse_scene(source, None, ParseOptions::default());
    }
}
