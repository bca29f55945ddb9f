//! In-memory runtime overrides layered on top of the persisted document.

use toml::{Table, Value};

use crate::error::ConfigError;
use crate::path;

/// Ordered dot-path → value mutations that have not been persisted.
///
/// Re-recording a key moves it to the end, so entries are always applied in
/// the order they were last written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuntimeOverrides {
    entries: Vec<(String, Value)>,
}

impl RuntimeOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key` as the most recent override.
    pub fn record(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        self.entries.retain(|(existing, _)| *existing != key);
        self.entries.push((key, value));
    }

    /// A copy of `document` with every override written over it, oldest
    /// write first.
    pub fn apply(&self, document: &Table) -> Table {
        let mut merged = document.clone();
        for (key, value) in &self.entries {
            path::set(&mut merged, key, value.clone());
        }
        merged
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Read-only copy of the entries, oldest write first.
    pub fn snapshot(&self) -> Vec<(String, Value)> {
        self.entries.clone()
    }

    /// Flat table keyed by the raw dot-paths, for display.
    pub fn to_table(&self) -> Table {
        self.entries.iter().cloned().collect()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Interpret a raw string as a TOML literal (`21`, `0.8`, `true`,
/// `[0, 255, 0]`, `"text"`), falling back to a plain string.
pub fn parse_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    toml::from_str::<Table>(&format!("value = {trimmed}"))
        .ok()
        .and_then(|mut table| table.remove("value"))
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

/// Split a `key=value` assignment, parsing the value with [`parse_value`].
pub fn parse_assignment(raw: &str) -> Result<(String, Value), ConfigError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or(ConfigError::MissingArgument("Value"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ConfigError::MissingArgument("Key"));
    }
    if value.trim().is_empty() {
        return Err(ConfigError::MissingArgument("Value"));
    }
    Ok((key.to_string(), parse_value(value)))
}
