//! Text documents
//!
//! The index works on documents, not files: a URI plus the full text. Reading files is left
//! to the caller ([crate::choicescript::project::ProjectIndex::load_dir] is the one
//! convenience that does it).

use crate::choicescript::ast::{Position, SourceLocation};
use crate::choicescript::error::{ProjectError, Result};
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// A document: URI, text and position conversion
#[derive(Debug, Clone)]
pub struct TextDocument {
    uri: Url,
    text: Arc<str>,
    location: SourceLocation,
}

impl TextDocument {
    pub fn new(uri: Url, text: &str) -> Self {
        Self {
            uri,
            location: SourceLocation::new(text),
            text: Arc::from(text),
        }
    }

    /// Read a document from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let io_error = |source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        };
        let absolute = std::fs::canonicalize(path).map_err(io_error)?;
        let text = std::fs::read_to_string(&absolute).map_err(io_error)?;
        let uri = Url::from_file_path(&absolute).map_err(|_| ProjectError::InvalidSceneUri {
            uri: absolute.display().to_string(),
        })?;
        Ok(Self::new(uri, &text))
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn offset_at(&self, position: Position) -> usize {
        self.location.position_to_byte(position)
    }

    pub fn position_at(&self, offset: usize) -> Position {
        self.location.byte_to_position(offset)
    }

    /// Scene name: the file name without its extension. `None` when the URI has no file
    /// name or a different extension.
    pub fn scene_name(&self, extension: &str) -> Option<String> {
        scene_name_of(&self.uri, extension)
    }
}

pub(crate) fn scene_name_of(uri: &Url, extension: &str) -> Option<String> {
    let file = uri.path_segments()?.next_back()?;
    let stem = file.strip_suffix(extension)?.strip_suffix('.')?;
    (!stem.is_empty()).then(|| stem.to_string())
}
