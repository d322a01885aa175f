//! JSON output for syntax trees
//!
//! Nodes nest the way they do in the tree; the kind is serialized with its payload and the
//! markers with their rule ids.

use crate::choicescript::ast::{NodeId, SyntaxTree};
use serde_json::{json, Value};

pub fn to_json(tree: &SyntaxTree) -> Value {
    node_json(tree, tree.root())
}

fn node_json(tree: &SyntaxTree, id: NodeId) -> Value {
    let node = tree.node(id);
    let mut value = json!({
        "kind": node.kind,
        "offset": node.offset,
        "length": node.length,
    });
    if !node.issues.is_empty() {
        value["issues"] = json!(node.issues);
    }
    if !node.data.is_empty() {
        value["data"] = json!(node.data);
    }
    if !node.children.is_empty() {
        let children: Vec<_> = node
            .children
            .iter()
            .map(|child| node_json(tree, *child))
            .collect();
        value["children"] = Value::Array(children);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choicescript::parsing::{parse_scene, ParseOptions};

    #[test]
    fn test_nests_children() {
        let tree = parse_scene("*label start\n", Some("intro"), ParseOptions::default());
        let value = to_json(&tree);
        assert_eq!(value["kind"]["Scene"]["name"], "intro");

        let line = &value["children"][0];
        assert_eq!(line["offset"], 0);
        let declaration = &line["children"][0];
        assert_eq!(declaration["kind"], "LabelDeclaration");
        assert_eq!(declaration["children"][0]["kind"], "Label");
    }

    #[test]
    fn test_includes_markers() {
        let tree = parse_scene("*frobnicate\n", None, ParseOptions::default());
        let value = to_json(&tree);
        let command = &value["children"][0]["children"][0];
        assert_eq!(command["issues"][0]["rule"]["id"], "unknown-command");
    }
}
