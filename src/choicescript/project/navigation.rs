//! Cross-scene navigation
//!
//! Go to definition and find references over a [ProjectIndex]. The node under the cursor
//! decides what is looked up:
//!
//!     Variable                 resolved through the index (local scene, then startup)
//!     Label                    resolved in its scene, or in the scene a SceneRef names
//!     LabelRef                 as its Label
//!     SceneRef                 the named scene
//!
//! A reference matches a target when it resolves to the very same binding, so shadowed
//! names in other scenes are never reported.

use super::{ProjectIndex, Resolution, SceneEntry};
use crate::choicescript::ast::{NodeId, NodeKind, SyntaxTree};
use crate::choicescript::scoping::ReferenceType;
use serde::Serialize;
use url::Url;

/// A range in a project document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub uri: Url,
    pub offset: usize,
    pub length: usize,
}

impl Location {
    fn of_node(entry: &SceneEntry, node: NodeId) -> Self {
        let node = entry.tree().node(node);
        Self {
            uri: entry.uri().clone(),
            offset: node.offset,
            length: node.length,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Target<'a> {
    Symbol(Resolution<'a>),
    Scene(&'a SceneEntry),
}

impl Target<'_> {
    fn same_as(&self, other: &Target<'_>) -> bool {
        match (self, other) {
            (Target::Symbol(a), Target::Symbol(b)) => std::ptr::eq(a.symbol, b.symbol),
            (Target::Scene(a), Target::Scene(b)) => a.name() == b.name(),
            _ => false,
        }
    }
}

impl ProjectIndex {
    /// Where the name at `offset` in the document `uri` is declared
    pub fn definition(&self, uri: &Url, offset: usize) -> Option<Location> {
        match self.target_at(uri, offset)? {
            Target::Symbol(resolution) => Some(declaration_location(resolution)),
            Target::Scene(scene) => Some(Location {
                uri: scene.uri().clone(),
                offset: 0,
                length: 0,
            }),
        }
    }

    /// Every place in the project naming what the name at `offset` names, declaration
    /// included
    pub fn references(&self, uri: &Url, offset: usize) -> Vec<Location> {
        let Some(target) = self.target_at(uri, offset) else {
            return Vec::new();
        };

        let mut found = Vec::new();
        for entry in self.scenes() {
            let tree = entry.tree();
            for id in tree.ids() {
                let matches = self
                    .resolve_node(entry, id)
                    .is_some_and(|candidate| candidate.same_as(&target));
                if matches {
                    found.push(Location::of_node(entry, id));
                }
            }
        }
        found
    }

    fn target_at(&self, uri: &Url, offset: usize) -> Option<Target<'_>> {
        let entry = self.scene_by_uri(uri)?;
        let tree = entry.tree();
        let mut node = tree.node_at_offset(offset)?;
        if *tree.kind(node) == NodeKind::LabelRef {
            node = tree.find_child(node, |kind| *kind == NodeKind::Label)?;
        }
        self.resolve_node(entry, node)
    }

    fn resolve_node<'a>(&'a self, entry: &'a SceneEntry, node: NodeId) -> Option<Target<'a>> {
        let tree = entry.tree();
        let name = tree.text(node);
        let offset = tree.node(node).offset;
        match tree.kind(node) {
            NodeKind::Variable => self
                .resolve(entry.name(), name, ReferenceType::Variable, offset)
                .map(Target::Symbol),
            NodeKind::Label => match qualifying_scene(tree, node) {
                Some(scene) => {
                    let target = self.scene(scene)?;
                    let symbol = target.symbols().find_symbol(name, ReferenceType::Label, 0)?;
                    Some(Target::Symbol(Resolution {
                        scene: target,
                        symbol,
                    }))
                }
                None => self
                    .resolve(entry.name(), name, ReferenceType::Label, offset)
                    .map(Target::Symbol),
            },
            NodeKind::SceneRef => self.scene(name).map(Target::Scene),
            _ => None,
        }
    }
}

/// Scene named next to a label, as in `*goto_scene chapter2 start`
fn qualifying_scene(tree: &SyntaxTree, label: NodeId) -> Option<&str> {
    let parent = tree.parent(label)?;
    if *tree.kind(parent) != NodeKind::LabelRef {
        return None;
    }
    let scene = tree.find_child(parent, |kind| *kind == NodeKind::SceneRef)?;
    Some(tree.text(scene))
}

fn declaration_location(resolution: Resolution<'_>) -> Location {
    let Resolution { scene, symbol } = resolution;
    let tree = scene.tree();
    let name = tree
        .children(symbol.node)
        .iter()
        .copied()
        .find(|child| {
            matches!(tree.kind(*child), NodeKind::Variable | NodeKind::Label)
                && tree.text(*child) == symbol.name
        })
        .unwrap_or(symbol.node);
    Location::of_node(scene, name)
}
