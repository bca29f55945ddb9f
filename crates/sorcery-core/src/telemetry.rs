//! Usage telemetry gate.
//!
//! Events are only emitted when `telemetry.enabled` is true and the
//! `DISABLE_TELEMETRY` environment variable is not set to a truthy value.
//! The environment variable wins over any stored or runtime value.

use std::path::Path;

use crate::config::Config;

/// Environment variable that force-disables telemetry.
pub const DISABLE_ENV: &str = "DISABLE_TELEMETRY";

/// File holding the anonymous user id, next to the config file.
pub const USER_ID_FILE: &str = ".user_id";

/// Outcome of a tracked action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Success,
    Failed,
}

impl ActionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

/// True for the values that switch telemetry off: `true`, `1`, `yes`.
pub fn is_disable_value(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

fn disabled_by_env() -> bool {
    std::env::var(DISABLE_ENV)
        .map(|v| is_disable_value(&v))
        .unwrap_or(false)
}

/// Decides whether telemetry events are emitted and emits them.
#[derive(Debug, Clone)]
pub struct TelemetryGate {
    enabled: bool,
    user_id: String,
}

impl TelemetryGate {
    /// Build the gate from the current snapshot and the environment.
    pub fn from_config(config: &Config, config_dir: Option<&Path>) -> Self {
        Self::new(config.telemetry.enabled, disabled_by_env(), config_dir)
    }

    /// Build the gate from explicit inputs.
    pub fn new(configured: bool, env_disabled: bool, config_dir: Option<&Path>) -> Self {
        if configured && env_disabled {
            tracing::debug!("Telemetry disabled via {DISABLE_ENV}");
        }
        Self {
            enabled: configured && !env_disabled,
            user_id: config_dir
                .map(read_user_id)
                .unwrap_or_else(|| "anonymous".to_string()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Emit one action event. Returns whether anything was emitted.
    pub fn record(&self, action_type: &str, identifier: &str, status: ActionStatus) -> bool {
        if !self.enabled {
            tracing::debug!("Telemetry skipped for {action_type}: {identifier}");
            return false;
        }

        let action_type = action_type.to_lowercase().replace(' ', "_");
        let user_id = self.user_id.as_str();
        let version = env!("CARGO_PKG_VERSION");
        let system = std::env::consts::OS;
        match status {
            ActionStatus::Success => tracing::info!(
                target: "sorcery::telemetry",
                user_id,
                version,
                system,
                action_type = %action_type,
                identifier,
                status = status.as_str(),
                "action completed"
            ),
            ActionStatus::Failed => tracing::warn!(
                target: "sorcery::telemetry",
                user_id,
                version,
                system,
                action_type = %action_type,
                identifier,
                status = status.as_str(),
                "action failed"
            ),
        }
        true
    }
}

fn read_user_id(dir: &Path) -> String {
    let path = dir.join(USER_ID_FILE);
    match std::fs::read_to_string(&path) {
        Ok(content) if !content.trim().is_empty() => content.trim().to_string(),
        Ok(_) | Err(_) => {
            tracing::debug!("No user id at {}, telemetry will use 'anonymous'", path.display());
            "anonymous".to_string()
        }
    }
}
