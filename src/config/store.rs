//! Named parameter sets with a global fallback.
//!
//! Algorithms read their parameters from the scope named after their
//! [`AlgorithmKey`](crate::algorithm::AlgorithmKey) (`name/config`). A key
//! absent from that scope is looked up in the `global` scope; absent there too
//! it is a [`ConfigError::Missing`].
//!
//! The store is filled once at startup and then shared as `Arc<ConfigStore>`;
//! only `&self` lookups are available from that point on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::error::{ConfigError, ConfigResult};

/// Name of the fallback scope.
pub const GLOBAL_SCOPE: &str = "global";

/// A typed scalar parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ConfigValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Int(_) => "int",
            ConfigValue::Float(_) => "float",
            ConfigValue::Str(_) => "string",
        }
    }

    /// Integers widen to float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(v) => Some(*v),
            ConfigValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(v) => write!(f, "{}", v),
            ConfigValue::Int(v) => write!(f, "{}", v),
            ConfigValue::Float(v) => write!(f, "{}", v),
            ConfigValue::Str(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Float(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Int(v)
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::Str(v.to_string())
    }
}

/// One named parameter set, ordered by parameter name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigEntry(BTreeMap<String, ConfigValue>);

impl ConfigEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for tests and programmatic setup.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ConfigValue) -> Option<ConfigValue> {
        self.0.insert(key.into(), value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Store of named configuration entries.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    entries: BTreeMap<String, ConfigEntry>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already-parsed scopes.
    pub fn from_entries(scopes: impl IntoIterator<Item = (String, ConfigEntry)>) -> Self {
        let mut store = Self::new();
        store.load(scopes);
        store
    }

    /// Merge scopes into the store. A key that already exists in a scope is
    /// overwritten by the incoming value. Returns the number of keys loaded.
    pub fn load(&mut self, scopes: impl IntoIterator<Item = (String, ConfigEntry)>) -> usize {
        let mut loaded = 0;
        for (scope, entry) in scopes {
            let target = self.entries.entry(scope.clone()).or_default();
            for (key, value) in entry.0 {
                if let Some(previous) = target.insert(key.clone(), value) {
                    tracing::debug!(
                        scope = %scope,
                        key = %key,
                        previous = %previous,
                        "Config key overridden by later source"
                    );
                }
                loaded += 1;
            }
        }
        loaded
    }

    /// Parse a TOML document whose top-level tables are scopes and merge it.
    ///
    /// The TOML parser rejects a key repeated within one document, so
    /// duplicates inside a single source surface as a parse error.
    pub fn load_toml(&mut self, text: &str) -> ConfigResult<usize> {
        let scopes: BTreeMap<String, ConfigEntry> = toml::from_str(text)?;
        Ok(self.load(scopes))
    }

    pub fn scope(&self, name: &str) -> Option<&ConfigEntry> {
        self.entries.get(name)
    }

    pub fn global(&self) -> Option<&ConfigEntry> {
        self.scope(GLOBAL_SCOPE)
    }

    pub fn scope_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Scoped lookup with global fallback, without failing.
    pub fn lookup(&self, scope: &str, key: &str) -> Option<&ConfigValue> {
        self.scope(scope)
            .and_then(|e| e.get(key))
            .or_else(|| self.global().and_then(|g| g.get(key)))
    }

    /// Scoped lookup with global fallback.
    pub fn get(&self, scope: &str, key: &str) -> ConfigResult<&ConfigValue> {
        self.lookup(scope, key).ok_or_else(|| ConfigError::Missing {
            scope: scope.to_string(),
            key: key.to_string(),
        })
    }

    pub fn get_f64(&self, scope: &str, key: &str) -> ConfigResult<f64> {
        let value = self.get(scope, key)?;
        value
            .as_f64()
            .ok_or_else(|| mismatch(scope, key, "float", value))
    }

    pub fn get_i64(&self, scope: &str, key: &str) -> ConfigResult<i64> {
        let value = self.get(scope, key)?;
        value.as_i64().ok_or_else(|| mismatch(scope, key, "int", value))
    }

    pub fn get_bool(&self, scope: &str, key: &str) -> ConfigResult<bool> {
        let value = self.get(scope, key)?;
        value.as_bool().ok_or_else(|| mismatch(scope, key, "bool", value))
    }

    pub fn get_str(&self, scope: &str, key: &str) -> ConfigResult<&str> {
        let value = self.get(scope, key)?;
        value.as_str().ok_or_else(|| mismatch(scope, key, "string", value))
    }

    /// Scoped `key`, falling back to a differently named global parameter.
    pub fn get_f64_or_global(&self, scope: &str, key: &str, global_key: &str) -> ConfigResult<f64> {
        let (found_scope, found_key, value) = self.get_renamed(scope, key, global_key)?;
        value
            .as_f64()
            .ok_or_else(|| mismatch(found_scope, found_key, "float", value))
    }

    pub fn get_i64_or_global(&self, scope: &str, key: &str, global_key: &str) -> ConfigResult<i64> {
        let (found_scope, found_key, value) = self.get_renamed(scope, key, global_key)?;
        value
            .as_i64()
            .ok_or_else(|| mismatch(found_scope, found_key, "int", value))
    }

    fn get_renamed<'a>(
        &'a self,
        scope: &'a str,
        key: &'a str,
        global_key: &'a str,
    ) -> ConfigResult<(&'a str, &'a str, &'a ConfigValue)> {
        if let Some(value) = self.scope(scope).and_then(|e| e.get(key)) {
            return Ok((scope, key, value));
        }
        match self.global().and_then(|g| g.get(global_key)) {
            Some(value) => Ok((GLOBAL_SCOPE, global_key, value)),
            None => Err(ConfigError::MissingWithGlobal {
                scope: scope.to_string(),
                key: key.to_string(),
                global_key: global_key.to_string(),
            }),
        }
    }
}

fn mismatch(scope: &str, key: &str, expected: &'static str, found: &ConfigValue) -> ConfigError {
    ConfigError::TypeMismatch {
        scope: scope.to_string(),
        key: key.to_string(),
        expected,
        found: found.type_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ConfigStore {
        ConfigStore::from_entries([
            (
                GLOBAL_SCOPE.to_string(),
                ConfigEntry::new()
                    .with("DFR-Ma", 1.0)
                    .with("Integrator-NPoints", 8i64)
                    .with("Shared", "global"),
            ),
            (
                "genie::ReinDFRPXSec/Default".to_string(),
                ConfigEntry::new().with("beta", 7.0).with("Shared", "scoped"),
            ),
        ])
    }

    #[test]
    fn test_scoped_value_wins() {
        let store = store();
        assert_eq!(
            store.get_str("genie::ReinDFRPXSec/Default", "Shared").unwrap(),
            "scoped"
        );
    }

    #[test]
    fn test_falls_back_to_global_without_scope() {
        let store = store();
        assert!(store.scope("genie::Unconfigured/Default").is_none());
        assert_eq!(
            store.get_i64("genie::Unconfigured/Default", "Integrator-NPoints").unwrap(),
            8
        );
    }

    #[test]
    fn test_missing_key_reports_scope_and_key() {
        let store = store();
        let err = store.get("genie::ReinDFRPXSec/Default", "Nope").unwrap_err();
        match err {
            ConfigError::Missing { scope, key } => {
                assert_eq!(scope, "genie::ReinDFRPXSec/Default");
                assert_eq!(key, "Nope");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_renamed_global_fallback() {
        let store = store();
        let scope = "genie::ReinDFRPXSec/Default";
        assert_eq!(store.get_f64_or_global(scope, "Ma", "DFR-Ma").unwrap(), 1.0);
        assert_eq!(store.get_f64_or_global(scope, "beta", "DFR-Beta").unwrap(), 7.0);
        assert!(matches!(
            store.get_f64_or_global(scope, "x", "DFR-x"),
            Err(ConfigError::MissingWithGlobal { .. })
        ));
    }

    #[test]
    fn test_int_widens_but_string_does_not() {
        let store = store();
        assert_eq!(store.get_f64("any", "Integrator-NPoints").unwrap(), 8.0);
        assert!(matches!(
            store.get_f64("any", "Shared"),
            Err(ConfigError::TypeMismatch { expected: "float", found: "string", .. })
        ));
    }

    #[test]
    fn test_later_load_overrides() {
        let mut store = store();
        store
            .load_toml(
                r#"
                [global]
                DFR-Ma = 1.3
                "#,
            )
            .unwrap();
        assert_eq!(store.get_f64("any", "DFR-Ma").unwrap(), 1.3);
        // untouched keys survive
        assert_eq!(store.get_i64("any", "Integrator-NPoints").unwrap(), 8);
    }

    #[test]
    fn test_duplicate_key_in_one_source_is_rejected() {
        let mut store = ConfigStore::new();
        let result = store.load_toml(
            r#"
            [global]
            a = 1
            a = 2
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
