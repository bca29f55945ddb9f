//! Configuration schema for Sorcery tools.
//!
//! [`Config`] is the typed, validated snapshot tools read their defaults
//! from. It is only ever built from a raw document through
//! [`Config::from_document`], which checks every field against the
//! descriptors in [`schema`] before deserializing.

pub mod schema;
mod types;
mod validate;

pub use schema::{available_keys, generate_documentation, schema_info, FieldInfo};
pub use types::*;

use crate::error::{ConfigError, Violation};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use toml::{Table, Value};

/// File name of the persisted document.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "SORCERY_CONFIG";

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Object detection settings
    pub detection: DetectionConfig,

    /// Object finding settings
    pub find: FindConfig,

    /// Blur settings
    pub blur: BlurConfig,

    /// Text drawing settings
    pub text: TextConfig,

    /// Shape drawing settings
    pub drawing: DrawingConfig,

    /// OCR settings
    pub ocr: OcrConfig,

    /// Resize settings
    pub resize: ResizeConfig,

    /// Telemetry settings
    pub telemetry: TelemetryConfig,
}

impl Config {
    /// Validate a raw document and build the typed snapshot from it.
    ///
    /// Absent sections and fields take their defaults. Any violated rule
    /// fails the whole construction; nothing is clamped.
    pub fn from_document(document: &Table) -> Result<Self, ConfigError> {
        validate::validate_document(document)?;
        Value::Table(document.clone())
            .try_into()
            .map_err(|e: toml::de::Error| {
                ConfigError::Validation(vec![Violation::new("<document>", e.to_string())])
            })
    }

    /// Render the snapshot as a raw document with every field present.
    pub fn to_document(&self) -> Result<Table, ConfigError> {
        match Value::try_from(self)? {
            Value::Table(table) => Ok(table),
            _ => Ok(Table::new()),
        }
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.sorcery.sorcery/config.toml
    /// - Linux: ~/.config/sorcery/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\sorcery\config\config.toml
    ///
    /// Falls back to ./config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "sorcery", "sorcery")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Resolve the config file path: explicit path first, then the
    /// `SORCERY_CONFIG` environment variable, then [`Config::default_path`].
    ///
    /// `~` is expanded in explicit and environment-provided paths.
    pub fn resolve_path(explicit: Option<&str>) -> PathBuf {
        let from_env = std::env::var(CONFIG_PATH_ENV).ok();
        match explicit.or(from_env.as_deref()).filter(|p| !p.is_empty()) {
            Some(raw) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
            None => Self::default_path(),
        }
    }
}
