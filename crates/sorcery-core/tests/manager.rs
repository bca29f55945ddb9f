//! End-to-end behaviour of the configuration manager over a real file.

use sorcery_core::config::{available_keys, CONFIG_FILE_NAME};
use sorcery_core::{Config, ConfigError, ConfigManager, TomlStore};
use std::path::PathBuf;
use toml::Value;

fn temp_path() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
    (dir, path)
}

#[test]
fn fresh_manager_creates_file_with_defaults() {
    let (_dir, path) = temp_path();
    let manager = ConfigManager::open_path(&path);

    assert!(path.exists());
    assert_eq!(manager.config().detection.confidence_threshold, 0.75);
    assert_eq!(manager.config(), &Config::default());
    assert!(manager.load_warning().is_none());
}

#[test]
fn runtime_set_leaves_file_untouched() {
    let (_dir, path) = temp_path();
    let mut manager = ConfigManager::open_path(&path);
    let before = std::fs::read_to_string(&path).unwrap();

    manager
        .set([("detection.confidence_threshold", Value::Float(0.9))], false)
        .unwrap();

    assert_eq!(manager.config().detection.confidence_threshold, 0.9);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn persisted_values_survive_reset_and_restart() {
    let (_dir, path) = temp_path();
    let mut manager = ConfigManager::open_path(&path);
    manager
        .set([("blur.strength", Value::Integer(21))], true)
        .unwrap();

    assert_eq!(manager.reset().blur.strength, 21);
    assert!(manager.runtime_overrides().is_empty());

    let reopened = ConfigManager::open_path(&path);
    assert_eq!(reopened.config().blur.strength, 21);
}

#[test]
fn reset_matches_fresh_load() {
    let (_dir, path) = temp_path();
    let mut manager = ConfigManager::open_path(&path);
    manager
        .set(
            [
                ("ocr.language", Value::String("fr".into())),
                ("telemetry.enabled", Value::Boolean(true)),
            ],
            false,
        )
        .unwrap();

    let reset = manager.reset().clone();
    let fresh = ConfigManager::open_path(&path);
    assert_eq!(&reset, fresh.config());
}

#[test]
fn get_all_is_idempotent() {
    let (_dir, path) = temp_path();
    let manager = ConfigManager::open_path(&path);
    assert_eq!(manager.get(None).unwrap(), manager.get(None).unwrap());
}

#[test]
fn save_then_load_round_trips() {
    let (_dir, path) = temp_path();
    let store = TomlStore::new(&path);
    let mut config = Config::default();
    config.drawing.color = [10, 20, 30];
    config.text.font_scale = 2.5;

    store.save(&config.to_document().unwrap()).unwrap();
    let loaded = store.load();
    assert!(loaded.warning.is_none());
    assert_eq!(Config::from_document(&loaded.document).unwrap(), config);
}

#[test]
fn boundary_values_are_accepted() {
    let (_dir, path) = temp_path();
    let mut manager = ConfigManager::open_path(&path);

    for value in [0.0, 1.0] {
        manager
            .set([("find.confidence_threshold", Value::Float(value))], false)
            .unwrap();
        assert_eq!(manager.config().find.confidence_threshold, value);
    }
    manager
        .set([("blur.strength", Value::Integer(1))], false)
        .unwrap();
    manager
        .set(
            [(
                "drawing.color",
                Value::Array(vec![Value::Integer(255), Value::Integer(0), Value::Integer(255)]),
            )],
            false,
        )
        .unwrap();
    assert_eq!(manager.config().drawing.color, [255, 0, 255]);
}

#[test]
fn rejected_set_changes_nothing() {
    let (_dir, path) = temp_path();
    let mut manager = ConfigManager::open_path(&path);
    let before = std::fs::read_to_string(&path).unwrap();

    let err = manager
        .set([("detection.confidence_threshold", Value::Float(1.5))], true)
        .unwrap_err();
    assert_eq!(err.kind(), "validation_failed");
    assert_eq!(err.violations()[0].path, "detection.confidence_threshold");

    assert_eq!(manager.config().detection.confidence_threshold, 0.75);
    assert!(manager.runtime_overrides().is_empty());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn missing_key_reports_sections() {
    let (_dir, path) = temp_path();
    let manager = ConfigManager::open_path(&path);

    match manager.get(Some("nonexistent.key")).unwrap_err() {
        ConfigError::NotFound { key, sections } => {
            assert_eq!(key, "nonexistent.key");
            assert!(sections.contains(&"detection".to_string()));
            assert!(sections.contains(&"telemetry".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn corrupt_file_degrades_to_defaults() {
    let (_dir, path) = temp_path();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "detection = [not toml").unwrap();

    let manager = ConfigManager::open_path(&path);
    assert_eq!(manager.config(), &Config::default());
    assert_eq!(manager.load_warning().unwrap().kind(), "store_read_failed");
}

#[test]
fn every_schema_key_resolves() {
    let (_dir, path) = temp_path();
    let manager = ConfigManager::open_path(&path);
    for key in available_keys() {
        assert!(manager.get(Some(&key)).is_ok(), "{key}");
    }
}
