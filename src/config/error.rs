//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::validation::ValidationError;

/// Error type for configuration loading and parameter lookup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    /// Required parameter absent from both the scope and the global entry.
    #[error("Missing config key '{key}' in scope '{scope}' (and in global)")]
    Missing { scope: String, key: String },

    #[error("Missing config key '{key}' in scope '{scope}' and '{global_key}' in global")]
    MissingWithGlobal {
        scope: String,
        key: String,
        global_key: String,
    },

    #[error("Config key '{key}' in scope '{scope}' is {found}, expected {expected}")]
    TypeMismatch {
        scope: String,
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
