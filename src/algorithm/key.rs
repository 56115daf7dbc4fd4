//! Algorithm identity: `(name, config)`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Configuration tag used when a key omits one.
pub const DEFAULT_CONFIG: &str = "Default";

/// Identifies a configured algorithm. Two resolutions of an equal key share
/// one instance.
///
/// Text form is `name/config`, e.g. `genie::ReinDFRPXSec/Default`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AlgorithmKey {
    pub name: String,
    pub config: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid algorithm key '{0}': expected 'name/config'")]
pub struct InvalidAlgorithmKey(pub String);

impl AlgorithmKey {
    pub fn new(name: impl Into<String>, config: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: config.into(),
        }
    }

    /// Key with the default configuration tag.
    pub fn with_default(name: impl Into<String>) -> Self {
        Self::new(name, DEFAULT_CONFIG)
    }

    /// The config-store scope this algorithm reads its parameters from.
    pub fn scope(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AlgorithmKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.config)
    }
}

impl FromStr for AlgorithmKey {
    type Err = InvalidAlgorithmKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, config) = match s.rsplit_once('/') {
            Some((name, config)) => (name.trim(), config.trim()),
            None => (s, DEFAULT_CONFIG),
        };
        if name.is_empty() || config.is_empty() {
            return Err(InvalidAlgorithmKey(s.to_string()));
        }
        Ok(Self::new(name, config))
    }
}

impl TryFrom<String> for AlgorithmKey {
    type Error = InvalidAlgorithmKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AlgorithmKey> for String {
    fn from(key: AlgorithmKey) -> Self {
        key.to_string()
    }
}
