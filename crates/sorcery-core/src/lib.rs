//! Sorcery Core - configuration and image operations for the Sorcery toolkit.
//!
//! Configuration is a persisted TOML document layered with session-scoped
//! runtime overrides. Every change is validated against a declarative schema
//! before it is committed, so the active snapshot is always valid.
//!
//! # Architecture
//!
//! ```text
//! config.toml → TomlStore → (+ RuntimeOverrides) → validate → Config
//!                                                      ↑
//!                             ConfigManager::set ──────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use sorcery_core::{Config, ConfigManager};
//!
//! let mut manager = ConfigManager::open_path(Config::default_path());
//! manager.set([("blur.strength", toml::Value::Integer(21))], false)?;
//! assert_eq!(manager.config().blur.strength, 21);
//! # Ok::<(), sorcery_core::ConfigError>(())
//! ```

pub mod config;
pub mod error;
pub mod imaging;
pub mod manager;
pub mod overrides;
pub mod path;
pub mod store;
pub mod telemetry;
pub mod tool;

pub use config::Config;
pub use error::{ConfigError, ImageError, ImageResult, Violation};
pub use imaging::{Area, ImageInfo, ImageTools};
pub use manager::{ConfigManager, SharedConfigManager};
pub use overrides::RuntimeOverrides;
pub use store::TomlStore;
pub use telemetry::{ActionStatus, TelemetryGate};
pub use tool::{ConfigAction, ConfigRequest, ConfigTool};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
