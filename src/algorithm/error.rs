//! Algorithm resolution errors.

use thiserror::Error;

use crate::algorithm::capability::CapabilityKind;
use crate::algorithm::key::{AlgorithmKey, InvalidAlgorithmKey};
use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// No factory registered under this name.
    #[error("Unknown algorithm '{name}' (requested as {key})")]
    UnknownAlgorithm { name: String, key: AlgorithmKey },

    /// Required parameter missing or mistyped.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A resolution chain came back to a key still being built.
    #[error("Cyclic algorithm dependency: {}", format_path(.path))]
    CyclicDependency { path: Vec<AlgorithmKey> },

    #[error("{key} does not provide {capability:?}, required by {requested_by}")]
    MissingCapability {
        key: AlgorithmKey,
        capability: CapabilityKind,
        requested_by: AlgorithmKey,
    },

    #[error("Invalid sub-algorithm reference {scope}.{param}: {source}")]
    InvalidKey {
        scope: String,
        param: String,
        #[source]
        source: InvalidAlgorithmKey,
    },

    #[error("Invalid parameter {scope}.{param}: {reason}")]
    InvalidParameter {
        scope: String,
        param: String,
        reason: String,
    },
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

fn format_path(path: &[AlgorithmKey]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
