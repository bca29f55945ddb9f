//! Tool-facing `config` action: get, set, or reset configuration and report
//! the outcome as a structured JSON object.
//!
//! Failures never escape as errors here. They are rendered as
//! `{action, error, kind, ...}` objects the calling protocol can return
//! verbatim.

use serde_json::{json, Map, Value as Json};
use std::fmt;
use std::str::FromStr;
use toml::Value;

use crate::config;
use crate::error::ConfigError;
use crate::manager::SharedConfigManager;

/// What the `config` tool should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigAction {
    #[default]
    Get,
    Set,
    Reset,
}

impl ConfigAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Set => "set",
            Self::Reset => "reset",
        }
    }
}

impl fmt::Display for ConfigAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get" => Ok(Self::Get),
            "set" => Ok(Self::Set),
            "reset" => Ok(Self::Reset),
            other => Err(format!(
                "Invalid action '{other}'. Must be 'get', 'set', or 'reset'"
            )),
        }
    }
}

/// One invocation of the `config` tool.
#[derive(Debug, Clone, Default)]
pub struct ConfigRequest {
    pub action: ConfigAction,
    pub key: Option<String>,
    pub value: Option<Value>,
    pub persist: bool,
}

impl ConfigRequest {
    pub fn get(key: Option<&str>) -> Self {
        Self {
            action: ConfigAction::Get,
            key: key.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn set(key: &str, value: Value, persist: bool) -> Self {
        Self {
            action: ConfigAction::Set,
            key: Some(key.to_string()),
            value: Some(value),
            persist,
        }
    }

    pub fn reset() -> Self {
        Self {
            action: ConfigAction::Reset,
            ..Self::default()
        }
    }
}

/// The `config` tool bound to a shared manager.
#[derive(Debug, Clone)]
pub struct ConfigTool {
    manager: SharedConfigManager,
}

impl ConfigTool {
    pub fn new(manager: SharedConfigManager) -> Self {
        Self { manager }
    }

    /// Help text for the tool, including every available key.
    pub fn description() -> String {
        format!(
            "View or update Sorcery configuration.\n\n\
             Actions: 'get' views values, 'set' updates a value for the current session \
             (or persists it with persist=true), 'reset' drops runtime overrides.\n\n{}\n\n\
             Examples:\n\
             - Get all config: config(action=\"get\")\n\
             - Get detection confidence: config(action=\"get\", key=\"detection.confidence_threshold\")\n\
             - Set blur strength: config(action=\"set\", key=\"blur.strength\", value=21)\n\
             - Set and persist: config(action=\"set\", key=\"detection.confidence_threshold\", value=0.8, persist=true)\n\
             - Reset overrides: config(action=\"reset\")",
            config::generate_documentation()
        )
    }

    /// Execute a request and render the result.
    pub fn run(&self, request: ConfigRequest) -> Json {
        tracing::info!(
            "Config tool called with action='{}', key={:?}, persist={}",
            request.action,
            request.key,
            request.persist
        );
        let action = request.action;
        let mut result = match self.execute(request) {
            Ok(result) => result,
            Err(e) => error_result(action, &e),
        };
        if let Some(warning) = self.manager.with(|m| m.load_warning().map(|w| w.to_string())) {
            if let Some(object) = result.as_object_mut() {
                object.insert("warning".into(), Json::String(warning));
            }
        }
        result
    }

    /// Parse the action name first, so an unknown action is reported the
    /// same way as any other failure.
    pub fn run_named(
        &self,
        action: &str,
        key: Option<&str>,
        value: Option<Value>,
        persist: bool,
    ) -> Json {
        match action.parse::<ConfigAction>() {
            Ok(action) => self.run(ConfigRequest {
                action,
                key: key.map(str::to_string),
                value,
                persist,
            }),
            Err(message) => {
                tracing::error!("Configuration value error: {message}");
                json!({
                    "action": action,
                    "error": message,
                    "kind": "invalid_action",
                    "message": "Please check the provided key and value",
                })
            }
        }
    }

    fn execute(&self, request: ConfigRequest) -> Result<Json, ConfigError> {
        match request.action {
            ConfigAction::Get => self.get(request.key.as_deref()),
            ConfigAction::Set => {
                let key = request.key.ok_or(ConfigError::MissingArgument("Key"))?;
                let value = request.value.ok_or(ConfigError::MissingArgument("Value"))?;
                self.set(&key, value, request.persist)
            }
            ConfigAction::Reset => {
                let config = self.manager.reset();
                tracing::info!("Reset runtime configuration overrides");
                Ok(json!({
                    "action": "reset",
                    "message": "Runtime configuration overrides reset successfully",
                    "config": to_json(&config.to_document()?),
                }))
            }
        }
    }

    fn get(&self, key: Option<&str>) -> Result<Json, ConfigError> {
        match key {
            None => {
                let (config, overrides, path) = self.manager.with(|m| {
                    (
                        m.get(None),
                        m.runtime_overrides_table(),
                        m.path().display().to_string(),
                    )
                });
                tracing::info!("Retrieved entire configuration");
                Ok(json!({
                    "action": "get",
                    "config": to_json(&config?),
                    "runtime_overrides": to_json(&overrides),
                    "config_file": path,
                    "message": "Current configuration retrieved successfully",
                }))
            }
            Some(key) => {
                let value = self.manager.get(Some(key))?;
                Ok(json!({
                    "action": "get",
                    "key": key,
                    "value": to_json(&value),
                    "message": format!("Configuration value for '{key}' retrieved successfully"),
                }))
            }
        }
    }

    fn set(&self, key: &str, value: Value, persist: bool) -> Result<Json, ConfigError> {
        let requested = to_json(&value);
        let new_value = self.manager.with(|m| -> Result<Value, ConfigError> {
            m.set([(key, value)], persist)?;
            m.get(Some(key))
        })?;

        let scope = if persist {
            " and persisted to file"
        } else {
            " for current session"
        };
        tracing::info!(
            "Updated configuration '{key}' to '{new_value}'{}",
            if persist { " (persisted)" } else { " (runtime only)" }
        );
        Ok(json!({
            "action": "set",
            "key": key,
            "old_value": requested,
            "new_value": to_json(&new_value),
            "persisted": persist,
            "message": format!("Configuration '{key}' updated successfully{scope}"),
        }))
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Json {
    serde_json::to_value(value).unwrap_or(Json::Null)
}

fn error_result(action: ConfigAction, error: &ConfigError) -> Json {
    let mut object = Map::new();
    object.insert("action".into(), json!(action.as_str()));
    object.insert("error".into(), json!(error.to_string()));
    object.insert("kind".into(), json!(error.kind()));

    match error {
        ConfigError::NotFound { sections, .. } => {
            tracing::error!("Configuration key error: {error}");
            object.insert("available_keys".into(), json!(config::available_keys()));
            object.insert("sections".into(), json!(sections));
        }
        ConfigError::Validation(violations) => {
            tracing::error!("Configuration value error: {error}");
            let details: Vec<Json> = violations
                .iter()
                .map(|v| json!({ "path": v.path, "rule": v.rule }))
                .collect();
            object.insert("violations".into(), Json::Array(details));
            object.insert(
                "message".into(),
                json!("Please check the provided key and value"),
            );
        }
        ConfigError::MissingArgument(_) => {
            tracing::error!("Configuration value error: {error}");
            object.insert(
                "message".into(),
                json!("Please check the provided key and value"),
            );
        }
        _ => {
            tracing::error!("Configuration tool error: {error}");
            object.insert(
                "message".into(),
                json!("An unexpected error occurred while processing the configuration request"),
            );
        }
    }
    Json::Object(object)
}
