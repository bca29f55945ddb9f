//! Command handlers and the state they share.

pub mod config;
pub mod image;

use sorcery_core::overrides::parse_assignment;
use sorcery_core::{Config, ConfigManager, SharedConfigManager};
use std::path::{Path, PathBuf};

/// Composition point for one invocation: where the config lives and which
/// `--set` overrides apply to it.
#[derive(Debug)]
pub struct Context {
    config_path: PathBuf,
    overrides: Vec<String>,
}

impl Context {
    pub fn new(explicit_path: Option<&str>, overrides: Vec<String>) -> Self {
        Self {
            config_path: Config::resolve_path(explicit_path),
            overrides,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Open the manager (creating the file if missing) and record the
    /// `--set` overrides as runtime overrides.
    pub fn manager(&self) -> anyhow::Result<SharedConfigManager> {
        let mut manager = ConfigManager::open_path(&self.config_path);
        if let Some(warning) = manager.load_warning() {
            tracing::warn!("{warning}");
        }

        if !self.overrides.is_empty() {
            let updates = self
                .overrides
                .iter()
                .map(|raw| parse_assignment(raw))
                .collect::<Result<Vec<_>, _>>()?;
            tracing::debug!("Applying {} command-line override(s)", updates.len());
            manager.set(updates, false)?;
        }

        Ok(SharedConfigManager::new(manager))
    }
}

/// Write a JSON result to stdout.
pub fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_applied_at_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let context = Context::new(
            path.to_str(),
            vec!["blur.strength=21".into(), "ocr.language=de".into()],
        );

        let manager = context.manager().unwrap();
        let config = manager.config();
        assert_eq!(config.blur.strength, 21);
        assert_eq!(config.ocr.language, "de");
        assert_eq!(manager.runtime_overrides().len(), 2);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let context = Context::new(path.to_str(), vec!["blur.strength=20".into()]);
        assert!(context.manager().is_err());
    }
}
