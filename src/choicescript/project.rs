//! Project index
//!
//!     A registry of the scenes of one project. Each entry holds a scene's document, its
//!     parsed tree and its scopes, keyed by scene name and reachable by document URI.
//!
//!         [document]     the text document the index parses
//!         [navigation]   definition and references across scenes
//!
//!     Entries change only through [ProjectIndex::sync], [ProjectIndex::sync_document] and
//!     [ProjectIndex::purge]. Every sync reparses the whole document.
//!
//!     The startup scene is the project's global scope: the variables it declares with
//!     `*create` resolve from every other scene unless shadowed there. `*temp` variables and
//!     labels stay inside their scene.

pub mod document;
pub mod navigation;

pub use document::TextDocument;
pub use navigation::Location;

use crate::choicescript::ast::{Diagnostic, Marker, NodeKind, SyntaxTree};
use crate::choicescript::config::Settings;
use crate::choicescript::error::{ProjectError, Result};
use crate::choicescript::parsing::parser::Parser;
use crate::choicescript::scoping::{build_scopes, ReferenceType, ScopeTree, Symbol, Symbols};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{info, warn};
use url::Url;

/// One indexed scene
#[derive(Debug, Clone)]
pub struct SceneEntry {
    name: String,
    document: TextDocument,
    tree: SyntaxTree,
    scopes: ScopeTree,
}

impl SceneEntry {
    fn build(name: String, document: TextDocument, settings: &Settings) -> Self {
        let parser = Parser::new(document.text(), settings.parse_options());
        let mut tree = parser.parse_scene(Some(&name), Some(document.uri().as_str()));
        let scopes = build_scopes(&mut tree);
        Self {
            name,
            document,
            tree,
            scopes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uri(&self) -> &Url {
        self.document.uri()
    }

    pub fn document(&self) -> &TextDocument {
        &self.document
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    pub fn symbols(&self) -> Symbols<'_> {
        Symbols::new(&self.tree, &self.scopes)
    }

    pub fn issues(&self) -> Vec<&Marker> {
        self.tree.collect_issues(self.tree.root())
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.issues()
            .into_iter()
            .map(|marker| marker.to_diagnostic(self.tree.location()))
            .collect()
    }
}

/// A symbol found through the index, with the scene that declares it
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a> {
    pub scene: &'a SceneEntry,
    pub symbol: &'a Symbol,
}

/// Registry of the scenes of one project
#[derive(Debug, Clone, Default)]
pub struct ProjectIndex {
    settings: Settings,
    root: Option<Url>,
    scenes: BTreeMap<String, SceneEntry>,
    names: HashMap<Url, String>,
}

impl ProjectIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Directory the project was synced from
    pub fn root(&self) -> Option<&Url> {
        self.root.as_ref()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// (Re)index `documents`. The project root is the directory holding `uri`; documents
    /// outside it, or whose URI names no scene, are skipped. Returns the number indexed.
    pub fn sync(
        &mut self,
        uri: &Url,
        documents: impl IntoIterator<Item = TextDocument>,
    ) -> Result<usize> {
        let root = uri.join(".").map_err(|_| ProjectError::InvalidSceneUri {
            uri: uri.to_string(),
        })?;

        let mut indexed = 0;
        let mut skipped = 0;
        for document in documents {
            if !document.uri().as_str().starts_with(root.as_str()) {
                info!(uri = %document.uri(), root = %root, "skipping document outside project");
                skipped += 1;
                continue;
            }
            match self.index(document) {
                Ok(_) => indexed += 1,
                Err(error) => {
                    warn!(%error, "skipping document");
                    skipped += 1;
                }
            }
        }
        self.root = Some(root);

        info!(indexed, skipped, scenes = self.scenes.len(), "synced project");
        Ok(indexed)
    }

    /// (Re)index a single document
    pub fn sync_document(&mut self, document: TextDocument) -> Result<&SceneEntry> {
        if self.root.is_none() {
            self.root = document.uri().join(".").ok();
        }
        self.index(document)
    }

    fn index(&mut self, document: TextDocument) -> Result<&SceneEntry> {
        let name = document
            .scene_name(&self.settings.project.scene_extension)
            .ok_or_else(|| ProjectError::InvalidSceneUri {
                uri: document.uri().to_string(),
            })?;
        let uri = document.uri().clone();

        // A scene name moving to another URI drops the stale mapping
        if let Some(previous) = self.scenes.get(&name) {
            if *previous.uri() != uri {
                self.names.remove(previous.uri());
            }
        }

        let entry = SceneEntry::build(name.clone(), document, &self.settings);
        self.names.insert(uri, name.clone());
        self.scenes.insert(name.clone(), entry);
        Ok(&self.scenes[&name])
    }

    /// Remove the scene of `uri`
    pub fn purge(&mut self, uri: &Url) -> Option<SceneEntry> {
        let name = self.names.remove(uri)?;
        let entry = self.scenes.remove(&name);
        info!(scene = %name, "purged scene");
        entry
    }

    /// Read every scene file of a directory and index them
    pub fn load_dir(&mut self, path: &Path) -> Result<usize> {
        let io_error = |source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        };
        let directory = std::fs::canonicalize(path).map_err(io_error)?;
        let root = Url::from_directory_path(&directory).map_err(|_| {
            ProjectError::InvalidSceneUri {
                uri: directory.display().to_string(),
            }
        })?;

        let extension = self.settings.project.scene_extension.as_str();
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&directory).map_err(io_error)? {
            let file = entry.map_err(io_error)?.path();
            if file.is_file() && file.extension().is_some_and(|ext| ext == extension) {
                files.push(file);
            }
        }
        files.sort();

        let documents = files
            .iter()
            .map(|file| TextDocument::from_path(file))
            .collect::<Result<Vec<_>>>()?;
        self.sync(&root, documents)
    }

    pub fn scene(&self, name: &str) -> Option<&SceneEntry> {
        self.scenes.get(name)
    }

    pub fn scene_by_uri(&self, uri: &Url) -> Option<&SceneEntry> {
        self.names.get(uri).and_then(|name| self.scenes.get(name))
    }

    pub fn scene_node_by_name(&self, name: &str) -> Option<&SyntaxTree> {
        self.scene(name).map(SceneEntry::tree)
    }

    pub fn scene_doc_by_name(&self, name: &str) -> Option<&TextDocument> {
        self.scene(name).map(SceneEntry::document)
    }

    /// Names of the indexed scenes, sorted
    pub fn scene_list(&self) -> Vec<&str> {
        self.scenes.keys().map(String::as_str).collect()
    }

    pub fn scenes(&self) -> impl Iterator<Item = &SceneEntry> {
        self.scenes.values()
    }

    pub fn startup_index(&self) -> Option<&SceneEntry> {
        self.scene(&self.settings.project.startup_scene)
    }

    pub fn symbols(&self, scene: &str) -> Option<Symbols<'_>> {
        self.scene(scene).map(SceneEntry::symbols)
    }

    /// Scenes named by the startup scene's `*scene_list`, in order
    pub fn scene_list_declared(&self) -> Vec<String> {
        let Some(startup) = self.startup_index() else {
            return Vec::new();
        };
        let tree = startup.tree();
        let Some(list) = tree.ids().find(|id| {
            matches!(tree.kind(*id), NodeKind::StandardCommand { name } if name == "scene_list")
        }) else {
            return Vec::new();
        };

        let mut names = Vec::new();
        tree.accept(list, |tree, id| {
            if *tree.kind(id) == NodeKind::SceneRef {
                names.push(tree.text(id).to_string());
            }
            true
        });
        names
    }

    /// Resolve `name` as seen from `offset` in `scene`: the scene's own bindings first, then
    /// the startup scene's `*create` variables.
    pub fn resolve(
        &self,
        scene: &str,
        name: &str,
        reference_type: ReferenceType,
        offset: usize,
    ) -> Option<Resolution<'_>> {
        let entry = self.scene(scene)?;
        if let Some(symbol) = entry.symbols().find_symbol(name, reference_type, offset) {
            return Some(Resolution {
                scene: entry,
                symbol,
            });
        }

        if reference_type != ReferenceType::Variable {
            return None;
        }
        let startup = self.startup_index()?;
        if startup.name() == entry.name() {
            return None;
        }
        startup
            .scopes()
            .symbols(startup.scopes().root())
            .iter()
            .rev()
            .find(|symbol| symbol.is_persistent() && symbol.name == name)
            .map(|symbol| Resolution {
                scene: startup,
                symbol,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(name: &str, text: &str) -> TextDocument {
        let uri = Url::parse(&format!("file:///game/scenes/{name}")).unwrap();
        TextDocument::new(uri, text)
    }

    fn project(documents: Vec<TextDocument>) -> ProjectIndex {
        let mut index = ProjectIndex::new();
        let uri = documents[0].uri().clone();
        index.sync(&uri, documents).unwrap();
        index
    }

    #[test]
    fn test_sync_keys_by_file_stem() {
        let index = project(vec![
            document("startup.txt", "*create strength 10\n"),
            document("chapter1.txt", "*set strength 11\n"),
        ]);
        assert_eq!(index.scene_list(), vec!["chapter1", "startup"]);
        assert!(index.startup_index().is_some());
        assert_eq!(
            index.root().map(Url::as_str),
            Some("file:///game/scenes/")
        );

        let uri = Url::parse("file:///game/scenes/chapter1.txt").unwrap();
        assert_eq!(index.scene_by_uri(&uri).unwrap().name(), "chapter1");
        assert_eq!(
            index.scene_doc_by_name("chapter1").unwrap().text(),
            "*set strength 11\n"
        );
    }

    #[test]
    fn test_sync_skips_foreign_and_invalid_documents() {
        let mut index = ProjectIndex::new();
        let uri = Url::parse("file:///game/scenes/startup.txt").unwrap();
        let outside = TextDocument::new(Url::parse("file:///other/intro.txt").unwrap(), "");
        let notes = document("notes.md", "");
        let indexed = index
            .sync(&uri, vec![document("startup.txt", ""), outside, notes])
            .unwrap();
        assert_eq!(indexed, 1);
        assert_eq!(index.scene_list(), vec!["startup"]);
    }

    #[test]
    fn test_resync_replaces_entry() {
        let mut index = project(vec![document("startup.txt", "*create a 1\n")]);
        index
            .sync_document(document("startup.txt", "*create b 1\n"))
            .unwrap();
        assert_eq!(index.len(), 1);
        let symbols = index.symbols("startup").unwrap();
        assert!(symbols.find_symbol("a", ReferenceType::Variable, 20).is_none());
        assert!(symbols.find_symbol("b", ReferenceType::Variable, 20).is_some());
    }

    #[test]
    fn test_purge() {
        let mut index = project(vec![
            document("startup.txt", ""),
            document("intro.txt", "Hello\n"),
        ]);
        let uri = Url::parse("file:///game/scenes/intro.txt").unwrap();
        let removed = index.purge(&uri).unwrap();
        assert_eq!(removed.name(), "intro");
        assert!(index.scene("intro").is_none());
        assert!(index.purge(&uri).is_none());
    }

    #[test]
    fn test_startup_creates_are_global() {
        let index = project(vec![
            document("startup.txt", "*create gold 10\n*temp secret 1\n*label begin\n"),
            document("shop.txt", "*set gold - 1\n"),
        ]);

        let found = index
            .resolve("shop", "gold", ReferenceType::Variable, 5)
            .unwrap();
        assert_eq!(found.scene.name(), "startup");
        assert_eq!(found.symbol.value.as_deref(), Some("10"));

        assert!(index
            .resolve("shop", "secret", ReferenceType::Variable, 5)
            .is_none());
        assert!(index
            .resolve("shop", "begin", ReferenceType::Label, 5)
            .is_none());
    }

    #[test]
    fn test_local_binding_shadows_global() {
        let index = project(vec![
            document("startup.txt", "*create gold 10\n"),
            document("shop.txt", "*temp gold 0\n*set gold 5\n"),
        ]);
        let found = index
            .resolve("shop", "gold", ReferenceType::Variable, 15)
            .unwrap();
        assert_eq!(found.scene.name(), "shop");
    }

    #[test]
    fn test_scene_list_declared() {
        let index = project(vec![document(
            "startup.txt",
            "*scene_list\n  startup\n  $chapter1\n  ending\n\n*finish\n",
        )]);
        assert_eq!(
            index.scene_list_declared(),
            vec!["startup", "chapter1", "ending"]
        );
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("startup.txt"), "*create a 1\n").unwrap();
        std::fs::write(dir.path().join("end.txt"), "*set a 2\n").unwrap();
        std::fs::write(dir.path().join("readme.md"), "# Notes\n").unwrap();

        let mut index = ProjectIndex::new();
        assert_eq!(index.load_dir(dir.path()).unwrap(), 2);
        assert_eq!(index.scene_list(), vec!["end", "startup"]);
        assert!(index.scene("end").unwrap().issues().is_empty());
    }
}
