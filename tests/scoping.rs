//! Scope resolution over parsed scenes

use choicescript::choicescript::ast::{DeclarationKind, NodeKind, SyntaxTree};
use choicescript::choicescript::parsing::{parse_scene, ParseOptions};
use choicescript::choicescript::scoping::{build_scopes, ReferenceType, ScopeTree, Symbols};

fn prepare(source: &str) -> (SyntaxTree, ScopeTree) {
    let mut tree = parse_scene(source, None, ParseOptions::default());
    let scopes = build_scopes(&mut tree);
    (tree, scopes)
}

#[test]
fn shadowing_in_nested_block() {
    let source = "*temp x 1\n*if true\n  *temp x 2\n  Inside.\nAfter.\n";
    let (tree, scopes) = prepare(source);
    let symbols = Symbols::new(&tree, &scopes);

    let inside = source.find("Inside").unwrap();
    let inner = symbols
        .find_symbol("x", ReferenceType::Variable, inside)
        .unwrap();
    assert_eq!(inner.value.as_deref(), Some("2"));

    let after = source.find("After").unwrap();
    let outer = symbols
        .find_symbol("x", ReferenceType::Variable, after)
        .unwrap();
    assert_eq!(outer.value.as_deref(), Some("1"));
}

#[test]
fn choice_options_are_scopes() {
    let source = "\
*choice
  #Left
    *temp path \"left\"
    *create visited_left true
    Left.
  #Right
    Right.
";
    let (tree, scopes) = prepare(source);
    let symbols = Symbols::new(&tree, &scopes);

    let left = source.find("Left.").unwrap();
    let right = source.find("Right.").unwrap();
    assert!(symbols
        .find_symbol("path", ReferenceType::Variable, left)
        .is_some());
    assert!(symbols
        .find_symbol("path", ReferenceType::Variable, right)
        .is_none());

    // create binds in the scene's root scope, visible after its declaration anywhere
    let visited = symbols
        .find_symbol("visited_left", ReferenceType::Variable, right)
        .unwrap();
    assert_eq!(visited.declaration, Some(DeclarationKind::Create));
}

#[test]
fn references_include_declaration() {
    let source = "*temp count 0\n*set count + 1\n*if count > 1\n  ${count} times.\n";
    let (tree, scopes) = prepare(source);
    let symbols = Symbols::new(&tree, &scopes);

    let symbol = symbols
        .find_symbol("count", ReferenceType::Variable, source.len())
        .unwrap();
    let references = symbols.references(symbol);
    assert_eq!(references.len(), 4);
    assert!(references
        .iter()
        .all(|id| *tree.kind(*id) == NodeKind::Variable && tree.text(*id) == "count"));
}

#[test]
fn labels_resolve_forward_and_backward() {
    let source = "*label top\n*goto bottom\n*label bottom\n*goto top\n";
    let (tree, scopes) = prepare(source);
    let symbols = Symbols::new(&tree, &scopes);

    let labels: Vec<_> = tree
        .ids()
        .filter(|id| *tree.kind(*id) == NodeKind::Label)
        .collect();
    assert_eq!(labels.len(), 4);
    for label in labels {
        let symbol = symbols.find_symbol_from_node(label).unwrap();
        assert_eq!(symbol.name, tree.text(label));
    }
}

#[test]
fn references_include_printed_values() {
    let source = "*temp gold 10\n*print gold\n*looplimit gold\n";
    let (tree, scopes) = prepare(source);
    let symbols = Symbols::new(&tree, &scopes);

    let symbol = symbols
        .find_symbol("gold", ReferenceType::Variable, source.len())
        .unwrap();
    let offsets: Vec<_> = symbols
        .references(symbol)
        .iter()
        .map(|id| tree.node(*id).offset)
        .collect();
    let printed = source.find("print gold").unwrap() + "print ".len();
    let limit = source.find("looplimit gold").unwrap() + "looplimit ".len();
    assert_eq!(offsets.len(), 3);
    assert!(offsets.contains(&printed));
    assert!(offsets.contains(&limit));
}
