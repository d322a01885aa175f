//! Settings
//!
//! The defaults live in `defaults/choicescript.default.toml`, compiled into the crate. A
//! [Loader] starts from them; files and single-key overrides layered on top win. Failures
//! surface as [ProjectError::Config](crate::choicescript::error::ProjectError::Config).

use crate::choicescript::ast::Level;
use crate::choicescript::error::Result;
use crate::choicescript::parsing::ParseOptions;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/choicescript.default.toml");

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub project: ProjectSettings,
    pub diagnostics: DiagnosticSettings,
}

/// How scenes are found and named
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectSettings {
    pub startup_scene: String,
    pub scene_extension: String,
}

/// Levels of the configurable markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DiagnosticSettings {
    pub mixed_indentation: Level,
    pub deprecated_modulo: Level,
}

impl From<&DiagnosticSettings> for ParseOptions {
    fn from(settings: &DiagnosticSettings) -> Self {
        ParseOptions {
            mixed_indentation: settings.mixed_indentation,
            deprecated_modulo: settings.deprecated_modulo,
        }
    }
}

impl Settings {
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::from(&self.diagnostics)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project: ProjectSettings {
                startup_scene: "startup".to_string(),
                scene_extension: "txt".to_string(),
            },
            diagnostics: DiagnosticSettings {
                mixed_indentation: Level::Warning,
                deprecated_modulo: Level::Warning,
            },
        }
    }
}

/// Settings assembled from the embedded defaults, then any files and overrides layered on
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let defaults = File::from_str(DEFAULT_TOML, FileFormat::Toml);
        Self {
            builder: Config::builder().add_source(defaults),
        }
    }

    /// Layer a TOML file; it must exist
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let file = File::from(path.as_ref()).format(FileFormat::Toml);
        self.builder = self.builder.add_source(file);
        self
    }

    /// Override one dotted key, such as `project.startup_scene`
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<Settings> {
        Ok(self.builder.build()?.try_deserialize()?)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choicescript::error::ProjectError;
    use std::io::Write;

    #[test]
    fn test_defaults_match_settings_default() {
        let settings = Loader::new().build().unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.diagnostics.deprecated_modulo, Level::Warning);
    }

    #[test]
    fn test_override_reaches_parse_options() {
        let settings = Loader::new()
            .set_override("diagnostics.mixed_indentation", "ignore")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(settings.parse_options().mixed_indentation, Level::Ignore);
    }

    #[test]
    fn test_user_file_keeps_other_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[project]\nstartup_scene = \"begin\"").unwrap();

        let settings = Loader::new().with_file(file.path()).build().unwrap();
        assert_eq!(settings.project.startup_scene, "begin");
        assert_eq!(settings.project.scene_extension, "txt");
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let result = Loader::new()
            .with_file("/nonexistent/choicescript.toml")
            .build();
        assert!(matches!(result, Err(ProjectError::Config(_))));
    }

    #[test]
    fn test_bad_level_is_a_config_error() {
        let result = Loader::new()
            .set_override("diagnostics.deprecated_modulo", "loud")
            .unwrap()
            .build();
        let error = result.unwrap_err();
        assert!(error.to_string().starts_with("invalid configuration:"));
    }
}
