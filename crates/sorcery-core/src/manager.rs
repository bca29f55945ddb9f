//! Configuration manager: persisted document + runtime overrides → one
//! validated snapshot.
//!
//! Every mutation builds a candidate document, validates it, and only then
//! commits it (to the override set or to disk) and reloads. A rejected
//! mutation leaves the snapshot, the overrides, and the file untouched.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use toml::{Table, Value};

use crate::config::{self, Config, FieldInfo};
use crate::error::ConfigError;
use crate::overrides::RuntimeOverrides;
use crate::path;
use crate::store::TomlStore;

/// Owns the override set and the current validated snapshot.
#[derive(Debug)]
pub struct ConfigManager {
    store: TomlStore,
    overrides: RuntimeOverrides,
    config: Config,
    warning: Option<ConfigError>,
}

impl ConfigManager {
    /// Open the manager over `store`, creating the backing file if needed
    /// and loading the first snapshot.
    pub fn open(store: TomlStore) -> Self {
        let mut manager = Self {
            store,
            overrides: RuntimeOverrides::new(),
            config: Config::default(),
            warning: None,
        };
        manager.load();
        manager
    }

    /// Open the manager over the file at `path`.
    pub fn open_path(path: impl AsRef<Path>) -> Self {
        Self::open(TomlStore::new(path.as_ref()))
    }

    /// Re-read the backing file, apply the overrides, and validate.
    ///
    /// Never fails: an unreadable file degrades to an empty base, and a
    /// document that fails validation degrades to defaults plus overrides.
    /// Either condition is kept as [`ConfigManager::load_warning`].
    pub fn load(&mut self) -> &Config {
        if let Err(e) = self.store.ensure_exists() {
            tracing::warn!("Could not create config file: {e}");
        }

        let loaded = self.store.load();
        let mut warning = loaded.warning;
        let merged = self.overrides.apply(&loaded.document);

        self.config = match Config::from_document(&merged) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(
                    "Persisted configuration at {} is invalid, using defaults: {e}",
                    self.store.path().display()
                );
                warning = Some(ConfigError::StoreRead {
                    path: self.store.path().to_path_buf(),
                    message: format!("persisted configuration is invalid: {e}"),
                });
                Config::from_document(&self.overrides.apply(&Table::new())).unwrap_or_default()
            }
        };
        self.warning = warning;

        tracing::debug!("Configuration loaded ({} runtime overrides)", self.overrides.len());
        &self.config
    }

    /// The current validated snapshot.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The whole snapshot as a table, or the value at a dot-path.
    pub fn get(&self, key: Option<&str>) -> Result<Value, ConfigError> {
        let document = self.config.to_document()?;
        match key {
            None => Ok(Value::Table(document)),
            Some(key) => {
                let value = path::get(&document, key)?.clone();
                tracing::debug!("Retrieved configuration value for '{key}': {value}");
                Ok(value)
            }
        }
    }

    /// Apply `updates` after validating the result.
    ///
    /// With `persist`, the full candidate document is written to disk and the
    /// override set is cleared. Otherwise the updates join the override set
    /// and the file is left alone.
    pub fn set<I, K>(&mut self, updates: I, persist: bool) -> Result<&Config, ConfigError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let updates: Vec<(String, Value)> = updates
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect();
        if updates.is_empty() {
            return Err(ConfigError::MissingArgument("Value"));
        }
        if updates.iter().any(|(key, _)| key.trim().is_empty()) {
            return Err(ConfigError::MissingArgument("Key"));
        }
        tracing::debug!("Updating configuration with {} value(s), persist: {persist}", updates.len());

        let mut candidate = self.config.to_document()?;
        for (key, value) in &updates {
            path::set(&mut candidate, key, value.clone());
        }
        let validated = Config::from_document(&candidate)?;

        if persist {
            self.store.save(&candidate)?;
            self.overrides.clear();
        } else {
            for (key, value) in updates {
                self.overrides.record(key, value);
            }
        }

        self.load();
        if self.config != validated {
            tracing::warn!(
                "Reloaded configuration differs from the validated update; {} changed on disk",
                self.store.path().display()
            );
        }
        Ok(&self.config)
    }

    /// Convenience wrapper for a single key.
    pub fn set_value(
        &mut self,
        key: &str,
        value: Value,
        persist: bool,
    ) -> Result<&Config, ConfigError> {
        self.set([(key, value)], persist)
    }

    /// Drop every runtime override and reload from disk.
    pub fn reset(&mut self) -> &Config {
        tracing::debug!("Resetting runtime overrides");
        self.overrides.clear();
        self.load()
    }

    /// Current overrides in insertion order.
    pub fn runtime_overrides(&self) -> Vec<(String, Value)> {
        self.overrides.snapshot()
    }

    /// Current overrides as a flat dot-path table.
    pub fn runtime_overrides_table(&self) -> Table {
        self.overrides.to_table()
    }

    /// Dot-path → description, type, and constraints for every field.
    pub fn schema_info(&self) -> Vec<(String, FieldInfo)> {
        config::schema_info()
    }

    /// Problem found by the most recent load, if any.
    pub fn load_warning(&self) -> Option<&ConfigError> {
        self.warning.as_ref()
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        self.store.path()
    }
}

/// Cloneable handle serializing access to one [`ConfigManager`].
///
/// Each call holds the lock for the whole validate → commit → reload
/// sequence.
#[derive(Debug, Clone)]
pub struct SharedConfigManager {
    inner: Arc<Mutex<ConfigManager>>,
}

impl SharedConfigManager {
    pub fn new(manager: ConfigManager) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ConfigManager> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the manager.
    pub fn with<R>(&self, f: impl FnOnce(&mut ConfigManager) -> R) -> R {
        f(&mut self.lock())
    }

    /// Clone of the current snapshot.
    pub fn config(&self) -> Config {
        self.lock().config().clone()
    }

    pub fn get(&self, key: Option<&str>) -> Result<Value, ConfigError> {
        self.lock().get(key)
    }

    pub fn set<I, K>(&self, updates: I, persist: bool) -> Result<Config, ConfigError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.lock().set(updates, persist).cloned()
    }

    pub fn reset(&self) -> Config {
        self.lock().reset().clone()
    }

    pub fn runtime_overrides(&self) -> Vec<(String, Value)> {
        self.lock().runtime_overrides()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (tempfile::TempDir, ConfigManager) {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::open_path(dir.path().join("config.toml"));
        (dir, manager)
    }

    #[test]
    fn test_open_creates_file_and_loads_defaults() {
        let (dir, manager) = open_temp();
        assert!(dir.path().join("config.toml").exists());
        assert_eq!(manager.config(), &Config::default());
        assert!(manager.load_warning().is_none());
    }

    #[test]
    fn test_set_runtime_does_not_touch_file() {
        let (dir, mut manager) = open_temp();
        let before = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();

        manager
            .set(
                [
                    ("detection.confidence_threshold", Value::Float(0.9)),
                    ("text.font_scale", Value::Float(2.0)),
                ],
                false,
            )
            .unwrap();

        assert_eq!(manager.config().detection.confidence_threshold, 0.9);
        assert_eq!(manager.config().text.font_scale, 2.0);
        let after = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
        assert_eq!(before, after);
        assert_eq!(manager.runtime_overrides().len(), 2);
    }

    #[test]
    fn test_set_section_table_merges() {
        let (_dir, mut manager) = open_temp();
        let mut drawing = Table::new();
        drawing.insert("thickness".into(), Value::Integer(4));

        manager.set_value("drawing", Value::Table(drawing), false).unwrap();
        assert_eq!(manager.config().drawing.thickness, 4);
        assert_eq!(manager.config().drawing.color, [0, 0, 0]);
    }

    #[test]
    fn test_latest_write_wins_across_section_and_field_keys() {
        let (_dir, mut manager) = open_temp();
        let blur = |strength: i64| {
            let mut table = Table::new();
            table.insert("strength".into(), Value::Integer(strength));
            Value::Table(table)
        };

        manager.set_value("blur", blur(21), false).unwrap();
        manager.set_value("blur.strength", Value::Integer(25), false).unwrap();
        let returned = manager.set_value("blur", blur(27), false).unwrap().blur.strength;

        assert_eq!(returned, 27);
        assert_eq!(manager.get(Some("blur.strength")).unwrap(), Value::Integer(27));
        let keys: Vec<String> = manager.runtime_overrides().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["blur.strength", "blur"]);
    }

    #[test]
    fn test_schema_info_covers_every_field() {
        let (_dir, manager) = open_temp();
        let info = manager.schema_info();
        assert_eq!(info.len(), config::schema::FIELDS.len());
        let (key, strength) = info
            .iter()
            .find(|(key, _)| key == "blur.strength")
            .unwrap();
        assert_eq!(key, "blur.strength");
        assert_eq!(strength.ty, "integer");
        assert_eq!(strength.constraints, "Odd number ≥ 1");
    }

    #[test]
    fn test_failed_set_changes_nothing() {
        let (_dir, mut manager) = open_temp();
        manager.set_value("blur.strength", Value::Integer(21), false).unwrap();

        let err = manager
            .set(
                [
                    ("ocr.language", Value::String("fr".into())),
                    ("blur.strength", Value::Integer(20)),
                ],
                false,
            )
            .unwrap_err();

        assert_eq!(err.kind(), "validation_failed");
        assert_eq!(err.violations()[0].path, "blur.strength");
        assert_eq!(manager.config().blur.strength, 21);
        assert_eq!(manager.config().ocr.language, "en");
        assert_eq!(manager.runtime_overrides().len(), 1);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let (_dir, mut manager) = open_temp();
        for key in ["detection.unknown", "colors.primary", "drawing.color.0"] {
            let err = manager.set_value(key, Value::Integer(1), false).unwrap_err();
            assert_eq!(err.kind(), "validation_failed", "{key}");
        }
        let err = manager.set_value("blur", Value::Integer(21), false).unwrap_err();
        assert_eq!(err.kind(), "validation_failed");
        assert!(manager.runtime_overrides().is_empty());
    }

    #[test]
    fn test_missing_arguments() {
        let (_dir, mut manager) = open_temp();
        let err = manager.set(Vec::<(String, Value)>::new(), false).unwrap_err();
        assert_eq!(err.kind(), "missing_argument");
        let err = manager.set_value(" ", Value::Integer(1), false).unwrap_err();
        assert_eq!(err.to_string(), "Key is required for 'set' action");
    }

    #[test]
    fn test_persist_clears_overrides() {
        let (_dir, mut manager) = open_temp();
        manager.set_value("text.font_scale", Value::Float(1.5), false).unwrap();
        manager.set_value("ocr.language", Value::String("fr".into()), true).unwrap();

        assert!(manager.runtime_overrides().is_empty());
        manager.reset();
        // The pending override was folded into the persisted candidate.
        assert_eq!(manager.config().text.font_scale, 1.5);
        assert_eq!(manager.config().ocr.language, "fr");
    }

    #[test]
    fn test_reset_discards_runtime_overrides() {
        let (_dir, mut manager) = open_temp();
        manager.set_value("detection.confidence_threshold", Value::Float(0.9), false).unwrap();
        let config = manager.reset();
        assert_eq!(config.detection.confidence_threshold, 0.75);
        assert!(manager.runtime_overrides().is_empty());
    }

    #[test]
    fn test_get_paths() {
        let (_dir, manager) = open_temp();
        assert_eq!(
            manager.get(Some("detection.confidence_threshold")).unwrap(),
            Value::Float(0.75)
        );
        assert!(manager.get(Some("blur")).unwrap().is_table());
        assert!(manager.get(None).unwrap().as_table().unwrap().contains_key("telemetry"));

        match manager.get(Some("nonexistent.key")).unwrap_err() {
            ConfigError::NotFound { key, sections } => {
                assert_eq!(key, "nonexistent.key");
                assert!(sections.contains(&"detection".to_string()));
                assert_eq!(sections.len(), config::schema::SECTIONS.len());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_file_degrades_to_defaults_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[blur]\nstrength = 20\n").unwrap();

        let manager = ConfigManager::open_path(&path);
        assert_eq!(manager.config().blur.strength, 15);
        assert_eq!(manager.load_warning().unwrap().kind(), "store_read_failed");
    }

    #[test]
    fn test_shared_manager_round_trip() {
        let (_dir, manager) = open_temp();
        let shared = SharedConfigManager::new(manager);
        let other = shared.clone();

        let updated = shared
            .set([("resize.interpolation", Value::String("cubic".into()))], false)
            .unwrap();
        assert_eq!(updated.resize.interpolation, config::Interpolation::Cubic);
        assert_eq!(other.config().resize.interpolation, config::Interpolation::Cubic);
        assert_eq!(other.runtime_overrides().len(), 1);

        other.reset();
        assert!(shared.runtime_overrides().is_empty());
        assert_eq!(shared.with(|m| m.config().blur.strength), 15);
    }
}
