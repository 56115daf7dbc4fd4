//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a spline run.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::algorithm::AlgorithmKey;
use crate::config::store::ConfigEntry;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Knot placement and persistence policy.
    pub splines: SplineSettings,

    /// Which generators to load and how many builds run at once.
    pub driver: DriverConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Algorithm parameter scopes (`global` plus `name/config` scopes).
    pub algorithms: BTreeMap<String, ConfigEntry>,
}

/// How a persisted spline table is ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicyKind {
    /// Load every entry in the table.
    #[default]
    All,
    /// Load only entries this run is going to need.
    Requested,
}

/// Spline construction settings.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SplineSettings {
    /// Lowest knot energy (GeV). Raised to an algorithm's validity floor.
    pub min_energy: f64,

    /// Knot density used when the caller gives no explicit count.
    pub knots_per_decade: u32,

    /// Absolute floor on the number of knots, applied to overrides too.
    pub min_knots: u32,

    /// Policy for `--input` tables.
    pub load_policy: LoadPolicyKind,
}

impl Default for SplineSettings {
    fn default() -> Self {
        Self {
            min_energy: 0.01,
            knots_per_decade: 15,
            min_knots: 30,
            load_policy: LoadPolicyKind::All,
        }
    }
}

/// Driver configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Cross-section models to load, as `name/config` keys.
    pub generators: Vec<AlgorithmKey>,

    /// Maximum concurrent spline builds.
    pub workers: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            generators: Vec::new(),
            workers: 4,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Record metrics during the run.
    pub metrics_enabled: bool,

    /// Where to write the Prometheus text dump at the end of a run.
    pub metrics_output: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_output: None,
        }
    }
}
