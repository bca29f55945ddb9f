//! Error types for Sorcery configuration and image operations.
//!
//! Errors carry enough structure (key paths, violated rules, file paths) for
//! the tool layer to render them without losing context.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// One violated schema rule, addressed by dot-path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dot-path of the offending section or field
    pub path: String,
    /// Human-readable description of the broken rule
    pub rule: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            rule: rule.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.rule)
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A dot-path does not resolve in the current document
    #[error("Configuration key '{key}' not found")]
    NotFound {
        /// The full requested path
        key: String,
        /// Top-level section names present in the document
        sections: Vec<String>,
    },

    /// A candidate document failed schema validation
    #[error("Invalid configuration: {}", join_violations(.0))]
    Validation(Vec<Violation>),

    /// The persisted file exists but could not be read or parsed
    #[error("Failed to read config file {path}: {message}")]
    StoreRead { path: PathBuf, message: String },

    /// The persisted file could not be written
    #[error("Failed to write config file {path}: {source}")]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document could not be rendered as TOML
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A `set` request omitted its key or value
    #[error("{0} is required for 'set' action")]
    MissingArgument(&'static str),
}

impl ConfigError {
    /// Stable machine-readable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Validation(_) => "validation_failed",
            Self::StoreRead { .. } => "store_read_failed",
            Self::StoreWrite { .. } => "store_write_failed",
            Self::Serialize(_) => "serialize_failed",
            Self::MissingArgument(_) => "missing_argument",
        }
    }

    /// Violations carried by a validation failure, empty for other kinds.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Validation(violations) => violations,
            _ => &[],
        }
    }
}

/// Image operation errors.
#[derive(Error, Debug)]
pub enum ImageError {
    /// Input image does not exist
    #[error("Input file not found: {0}. Please provide a full path to the file.")]
    InputNotFound(PathBuf),

    /// Image could not be decoded
    #[error("Failed to read image {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Image could not be encoded or written
    #[error("Failed to save image {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Caller supplied arguments the operation cannot honour
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Filesystem errors around an image path
    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for image operation results.
pub type ImageResult<T> = std::result::Result<T, ImageError>;
