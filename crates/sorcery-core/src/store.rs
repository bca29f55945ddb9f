//! Persisted configuration document on disk.
//!
//! The store holds no document state: every call re-reads or re-writes the
//! backing TOML file.

use std::path::{Path, PathBuf};
use toml::Table;

use crate::config::Config;
use crate::error::ConfigError;

/// Default document shipped with the library, used to create a missing
/// config file.
pub const BUNDLED_DEFAULT: &str = include_str!("../config.default.toml");

const GENERATED_HEADER: &str = "# Sorcery configuration\n\
# Generated from configuration system defaults\n\n";

/// Result of reading the backing file.
#[derive(Debug)]
pub struct LoadedDocument {
    /// Parsed document; empty when the file could not be read
    pub document: Table,
    /// Set when the file existed but could not be read or parsed
    pub warning: Option<ConfigError>,
}

/// TOML file adapter for the persisted document.
#[derive(Debug, Clone)]
pub struct TomlStore {
    path: PathBuf,
    bundled: Option<&'static str>,
}

impl TomlStore {
    /// Create a store backed by `path`, seeded from [`BUNDLED_DEFAULT`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            bundled: Some(BUNDLED_DEFAULT),
        }
    }

    /// Seed a missing file from `contents` instead of the bundled document.
    pub fn with_bundled_default(mut self, contents: &'static str) -> Self {
        self.bundled = Some(contents);
        self
    }

    /// Seed a missing file from schema defaults only.
    pub fn without_bundled_default(mut self) -> Self {
        self.bundled = None;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the backing file if it is absent. Returns whether a file was
    /// written.
    pub fn ensure_exists(&self) -> Result<bool, ConfigError> {
        if self.path.exists() {
            tracing::debug!("Config file already exists at: {}", self.path.display());
            return Ok(false);
        }
        self.write_defaults()?;
        tracing::info!("Created {} with default values", self.path.display());
        Ok(true)
    }

    /// Write the default document, atomically replacing any existing file.
    pub fn write_defaults(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::StoreWrite {
                path: self.path.clone(),
                source,
            })?;
        }

        let contents = self.initial_contents()?;
        self.write_atomic(&contents)
    }

    /// Bundled document when it is usable, else rendered schema defaults.
    fn initial_contents(&self) -> Result<String, ConfigError> {
        if let Some(bundled) = self.bundled {
            match check_document_text(bundled) {
                Ok(()) => return Ok(bundled.to_string()),
                Err(e) => {
                    tracing::warn!("Bundled default config is unusable ({e}), using schema defaults")
                }
            }
        }
        Ok(format!("{GENERATED_HEADER}{}", Config::default().to_toml()?))
    }

    /// Parse the backing file.
    ///
    /// Read and parse failures are logged and reported as a warning next to
    /// an empty document, so callers fall back to schema defaults.
    pub fn load(&self) -> LoadedDocument {
        let result = std::fs::read_to_string(&self.path)
            .map_err(|e| e.to_string())
            .and_then(|content| toml::from_str::<Table>(&content).map_err(|e| e.to_string()));

        match result {
            Ok(document) => {
                tracing::info!("Loaded configuration from: {}", self.path.display());
                LoadedDocument {
                    document,
                    warning: None,
                }
            }
            Err(message) => {
                tracing::error!(
                    "Failed to load configuration from {}: {message}",
                    self.path.display()
                );
                LoadedDocument {
                    document: Table::new(),
                    warning: Some(ConfigError::StoreRead {
                        path: self.path.clone(),
                        message,
                    }),
                }
            }
        }
    }

    /// Overwrite the backing file with `document`.
    pub fn save(&self, document: &Table) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(document)?;
        self.write_atomic(&contents)?;
        tracing::info!("Configuration saved to: {}", self.path.display());
        Ok(())
    }

    /// Write through a sibling temp file and rename it into place so readers
    /// never observe a partial document.
    fn write_atomic(&self, contents: &str) -> Result<(), ConfigError> {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| crate::config::CONFIG_FILE_NAME.to_string());
        let tmp = self.path.with_file_name(format!(".{file_name}.tmp"));

        let to_store_error = |source| ConfigError::StoreWrite {
            path: self.path.clone(),
            source,
        };
        std::fs::write(&tmp, contents).map_err(to_store_error)?;
        std::fs::rename(&tmp, &self.path).map_err(|source| {
            let _ = std::fs::remove_file(&tmp);
            to_store_error(source)
        })
    }
}

fn check_document_text(text: &str) -> Result<(), String> {
    let document: Table = toml::from_str(text).map_err(|e| e.to_string())?;
    Config::from_document(&document).map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_default_is_valid() {
        let document: Table = toml::from_str(BUNDLED_DEFAULT).unwrap();
        assert_eq!(Config::from_document(&document).unwrap(), Config::default());
    }

    #[test]
    fn test_ensure_exists_creates_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlStore::new(dir.path().join("nested").join("config.toml"));

        assert!(store.ensure_exists().unwrap());
        assert!(store.path().exists());
        assert!(!store.ensure_exists().unwrap());

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("[detection]"));
        assert!(content.contains("[blur]"));
    }

    #[test]
    fn test_ensure_exists_falls_back_to_schema_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlStore::new(dir.path().join("config.toml"))
            .with_bundled_default("[blur]\nstrength = 20\n");

        store.ensure_exists().unwrap();
        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.starts_with("# Sorcery configuration"));
        assert!(content.contains("strength = 15"));
    }

    #[test]
    fn test_write_defaults_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[blur]\nstrength = 31\n").unwrap();

        let store = TomlStore::new(&path).without_bundled_default();
        assert!(!store.ensure_exists().unwrap());
        store.write_defaults().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Sorcery configuration"));
        assert!(content.contains("strength = 15"));
        assert!(!dir.path().join(".config.toml.tmp").exists());
    }

    #[test]
    fn test_load_corrupt_file_returns_empty_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[detection\nconfidence_threshold = ").unwrap();

        let loaded = TomlStore::new(&path).load();
        assert!(loaded.document.is_empty());
        assert_eq!(loaded.warning.unwrap().kind(), "store_read_failed");
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlStore::new(dir.path().join("config.toml"));

        let mut config = Config::default();
        config.ocr.language = "fr".into();
        config.drawing.color = [255, 255, 255];
        store.save(&config.to_document().unwrap()).unwrap();

        let loaded = store.load();
        assert!(loaded.warning.is_none());
        assert_eq!(Config::from_document(&loaded.document).unwrap(), config);
        assert!(!dir.path().join(".config.toml.tmp").exists());
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlStore::new(dir.path().join("missing").join("config.toml"));

        let err = store.save(&Table::new()).unwrap_err();
        assert_eq!(err.kind(), "store_write_failed");
    }
}
