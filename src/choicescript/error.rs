//! Error types
//!
//! Scanning, parsing and scope building never fail; they report problems as markers. The
//! surfaces that touch the outside world (scene URIs, the file system, configuration files)
//! return [ProjectError].

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectError {
    /// The URI does not name a scene file
    #[error("'{uri}' does not name a scene file")]
    InvalidSceneUri { uri: String },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, ProjectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let error = ProjectError::InvalidSceneUri {
            uri: "file:///".to_string(),
        };
        assert_eq!(error.to_string(), "'file:///' does not name a scene file");

        let error = ProjectError::Io {
            path: PathBuf::from("scenes/startup.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(error.to_string(), "failed to read scenes/startup.txt: missing");
    }
}
