//! Treeviz formatter for syntax trees
//!
//! One line per node, nesting drawn with box connectors, so a whole scene can be scanned at a
//! glance. Each line holds the node kind with its payload, an excerpt of the source it covers
//! (first line only, truncated to 30 characters) and the number of markers attached to it:
//!
//!     Scene(intro)
//!     └─ Line(#0 Command indent=0) "*goto end"
//!       └─ FlowCommand(goto) "*goto end"
//!         └─ LabelRef "end"
//!           └─ Label "end"

use crate::choicescript::ast::{NodeId, SyntaxTree};

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

pub fn to_treeviz_str(tree: &SyntaxTree) -> String {
    let mut result = String::new();
    let root = tree.root();
    result.push_str(&node_label(tree, root));
    result.push('\n');
    append_children(&mut result, tree, root, "");
    result
}

fn node_label(tree: &SyntaxTree, node: NodeId) -> String {
    let mut label = tree.kind(node).to_string();
    if node != tree.root() {
        let excerpt = tree.text(node).lines().next().unwrap_or("").trim_end();
        if !excerpt.is_empty() {
            label.push_str(&format!(" \"{}\"", truncate(excerpt, 30)));
        }
    }
    match tree.issues(node).len() {
        0 => {}
        1 => label.push_str(" [1 issue]"),
        n => label.push_str(&format!(" [{n} issues]")),
    }
    label
}

fn append_node(result: &mut String, tree: &SyntaxTree, node: NodeId, prefix: &str, is_last: bool) {
    let connector = if is_last { "└─" } else { "├─" };
    result.push_str(&format!(
        "{}{} {}\n",
        prefix,
        connector,
        node_label(tree, node)
    ));

    let new_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    append_children(result, tree, node, &new_prefix);
}

fn append_children(result: &mut String, tree: &SyntaxTree, node: NodeId, prefix: &str) {
    let children = tree.children(node);
    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        append_node(result, tree, *child, prefix, is_last);
    }
}
