//=========================================================================
// Engine Configuration
//=========================================================================
//
// TOML-backed configuration for an engine session. Every section has a
// default, so an empty file is a valid configuration.
//
// ```toml
// [window]
// title = "Demo"
// width = 1280
// height = 800
//
// [display]            # logical resolution for cursor mapping
// width = 640
// height = 400
//
// [logging]
// filter = "aetheric_core=debug"
//
// [[bindings.groups]]
// name = "gameplay"
//
// [[bindings.actions]]
// name = "jump"
// group = "gameplay"
//
// [keymap.actions]
// Space = "jump"
// ```
//
//=========================================================================

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::input::table::BindingConfig;
use crate::core::input::viewport::LogicalResolution;
use crate::logging::LoggingConfig;
use crate::platform::keymap::KeyMapConfig;

//=== ConfigError =========================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown key or mouse button '{0}'")]
    UnknownInput(String),
}

//=== Sections ============================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Aetheric Engine".to_string(),
            width: 1280,
            height: 800,
        }
    }
}

//=== EngineConfig ========================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window: WindowConfig,
    pub display: LogicalResolution,
    pub bindings: BindingConfig,
    pub keymap: KeyMapConfig,
    pub logging: LoggingConfig,
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();

        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.display, LogicalResolution::new(640, 400));
        assert_eq!(config.window.title, "Aetheric Engine");
    }

    #[test]
    fn sections_override_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [window]
            title = "Demo"

            [display]
            width = 320

            [logging]
            filter = "debug"

            [[bindings.groups]]
            name = "gameplay"

            [[bindings.actions]]
            name = "jump"
            group = "gameplay"

            [keymap.actions]
            Space = "jump"
            "#,
        )
        .unwrap();

        assert_eq!(config.window.title, "Demo");
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.display, LogicalResolution::new(320, 400));
        assert_eq!(config.logging.filter.as_deref(), Some("debug"));
        assert_eq!(config.bindings.actions.len(), 1);
        assert_eq!(config.keymap.actions.get("Space").map(String::as_str), Some("jump"));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[window]\nwidth = 800").unwrap();

        let config = EngineConfig::load(file.path()).unwrap();

        assert_eq!(config.window.width, 800);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EngineConfig::load("/definitely/not/here.toml").unwrap_err();

        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        assert!(matches!(
            EngineConfig::from_toml_str("[window\n"),
            Err(ConfigError::Parse(_))
        ));
    }
}
