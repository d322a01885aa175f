//! Parser behaviour on whole scenes: markers per command, type inference, fault isolation

use choicescript::choicescript::ast::{CsType, NodeId, NodeKind, SyntaxTree};
use choicescript::choicescript::parsing::commands::{classify_command, CommandClass};
use choicescript::choicescript::parsing::{parse_scene, ParseOptions};
use choicescript::choicescript::scoping::{build_scopes, ReferenceType, Symbols};
use rstest::rstest;

fn parse(source: &str) -> SyntaxTree {
    parse_scene(source, None, ParseOptions::default())
}

fn rule_ids(tree: &SyntaxTree) -> Vec<&'static str> {
    tree.collect_issues(tree.root())
        .iter()
        .map(|marker| marker.rule().id)
        .collect()
}

fn find_kind(tree: &SyntaxTree, name: &str) -> Vec<NodeId> {
    tree.ids()
        .filter(|id| tree.kind(*id).name() == name)
        .collect()
}

/// Value node of `*set x <expression>`
fn set_value(tree: &SyntaxTree) -> NodeId {
    let set = find_kind(tree, "SetCommand")[0];
    *tree.children(set).last().unwrap()
}

#[rstest]
#[case("true and true", CsType::Boolean)]
#[case("\"Jane \" & doe", CsType::String)]
#[case("5*num", CsType::Number)]
#[case("fair %+ notfair", CsType::Number)]
#[case("gold modulo 3", CsType::Number)]
#[case("name & 3", CsType::String)]
#[case("x >= 2 or done", CsType::Boolean)]
#[case("\"a\" * 2", CsType::Unknown)]
#[case("true + 1", CsType::Unknown)]
#[case("round(gold / 2) + 1", CsType::Number)]
fn infers_expression_type(#[case] expression: &str, #[case] expected: CsType) {
    let tree = parse(&format!("*set x {expression}\n"));
    assert_eq!(tree.kind(set_value(&tree)).cs_type(), Some(expected));
}

#[rstest]
#[case("goto", CommandClass::Flow)]
#[case("goto_scene", CommandClass::Flow)]
#[case("finish", CommandClass::Flow)]
#[case("set", CommandClass::Ordinary)]
#[case("stat_chart", CommandClass::Ordinary)]
#[case("selectable_if", CommandClass::Ordinary)]
#[case("frobnicate", CommandClass::Unknown)]
fn classifies_commands(#[case] name: &str, #[case] expected: CommandClass) {
    assert_eq!(classify_command(name), expected);
}

#[rstest]
#[case("*frobnicate now", "unknown-command")]
#[case("*temp", "variable-name-expected")]
#[case("*create gold", "expression-expected")]
#[case("*label", "label-name-expected")]
#[case("*goto_scene", "scene-name-expected")]
#[case("*goto start extra", "unexpected-token")]
#[case("*set x (1", "right-parenthesis-expected")]
#[case("*set x arr[1", "right-bracket-expected")]
#[case("*set x 1 +", "term-expected")]
#[case("*set x \"open", "missing-closing-quote")]
#[case("*set x 7 % 2", "deprecated-modulo")]
#[case("*choice", "no-choice-options")]
#[case("#Stray option", "option-outside-choice")]
#[case("Hello @{x one}", "not-enough-multireplace-options")]
#[case("Hello ${name", "right-curly-expected")]
fn marks_malformed_line(#[case] source: &str, #[case] expected: &str) {
    let tree = parse(source);
    assert_eq!(rule_ids(&tree), vec![expected]);
}

#[test]
fn deprecated_modulo_level_is_configurable() {
    let options = ParseOptions {
        deprecated_modulo: choicescript::choicescript::ast::Level::Ignore,
        ..ParseOptions::default()
    };
    let tree = parse_scene("*set x 7 % 2\n", None, options);
    assert!(rule_ids(&tree).is_empty());
    assert_eq!(tree.kind(set_value(&tree)).cs_type(), Some(CsType::Number));
}

#[test]
fn concrete_scenario_temp_set_label() {
    let mut tree = parse("*temp var1\n*set v\n*label");
    let scopes = build_scopes(&mut tree);

    let symbols: Vec<_> = scopes
        .symbols(scopes.find_scope(0, 0))
        .iter()
        .map(|symbol| (symbol.name.as_str(), symbol.reference_type))
        .collect();
    assert_eq!(symbols, vec![("var1", ReferenceType::Variable)]);

    assert_eq!(rule_ids(&tree), vec!["expression-expected", "label-name-expected"]);

    let lookup = Symbols::new(&tree, &scopes);
    assert!(lookup
        .find_symbol("var1", ReferenceType::Variable, 12)
        .is_some());
}

#[test]
fn fault_isolation() {
    let clean = "*temp a 1\n*temp b \"two\"\n*label middle\n*set a a + 1\n*goto middle\n";
    let broken = "*temp a 1\n*temp b \"two\"\n*set (\n*label middle\n*set a a + 1\n*goto middle\n";

    let mut clean_tree = parse(clean);
    let clean_scopes = build_scopes(&mut clean_tree);
    assert!(rule_ids(&clean_tree).is_empty());

    let mut broken_tree = parse(broken);
    let broken_scopes = build_scopes(&mut broken_tree);
    assert_eq!(rule_ids(&broken_tree), vec!["variable-name-expected"]);

    let clean_symbols = Symbols::new(&clean_tree, &clean_scopes);
    let broken_symbols = Symbols::new(&broken_tree, &broken_scopes);
    for (name, reference_type) in [
        ("a", ReferenceType::Variable),
        ("b", ReferenceType::Variable),
        ("middle", ReferenceType::Label),
    ] {
        let expected = clean_symbols
            .find_symbol(name, reference_type, clean.len())
            .unwrap();
        let found = broken_symbols
            .find_symbol(name, reference_type, broken.len())
            .unwrap();
        assert_eq!(found.value, expected.value);
        assert_eq!(found.value_type, expected.value_type);
    }
}

#[test]
fn choice_structure() {
    let source = "\
*choice
  *if (gold > 5) #Buy the sword
    *set gold - 5
    *goto armed
  *hide_reuse #Leave
    *finish
  Stray text
*label armed
";
    let tree = parse(source);
    let options = find_kind(&tree, "ChoiceOption");
    assert_eq!(options.len(), 2);
    assert_eq!(
        *tree.kind(options[0]),
        NodeKind::ChoiceOption {
            reuse: None,
            conditional: true
        }
    );
    assert_eq!(rule_ids(&tree), vec!["choice-option-expected"]);

    // the label after the block belongs to the scene again
    let label = find_kind(&tree, "LabelDeclaration")[0];
    let line = tree.parent(label).unwrap();
    assert_eq!(tree.parent(line), Some(tree.root()));
}

#[test]
fn mixed_indentation_is_reported_once_per_line() {
    let source = "*if true\n  Spaces\n*if false\n\tTab\n";
    let tree = parse(source);
    assert_eq!(rule_ids(&tree), vec!["mixed-indentation"]);
}

#[test]
fn scene_list_entries() {
    let tree = parse("*scene_list\n  startup\n  $chapter1\n\n*finish\n");
    let scenes: Vec<_> = find_kind(&tree, "SceneRef")
        .into_iter()
        .map(|id| tree.text(id))
        .collect();
    assert_eq!(scenes, vec!["startup", "chapter1"]);
    assert!(rule_ids(&tree).is_empty());
}
