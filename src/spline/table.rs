//! On-disk spline table.
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "entries": [
//!     { "process": {...}, "algorithm": "genie::ScalingDISPXSec/Default",
//!       "knots": [{ "energy": 0.5, "value": 1.2e-38 }, ...] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::algorithm::AlgorithmKey;
use crate::interaction::ProcessKey;
use crate::spline::curve::Spline;

pub const TABLE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplineTable {
    pub format_version: u32,
    #[serde(default)]
    pub entries: Vec<SplineRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplineRecord {
    pub process: ProcessKey,
    pub algorithm: AlgorithmKey,
    #[serde(rename = "knots")]
    pub spline: Spline,
}

/// Which table entries a load keeps.
#[derive(Debug, Clone, Default)]
pub enum LoadPolicy {
    #[default]
    All,
    /// Only processes the current run will ask for.
    Requested(HashSet<ProcessKey>),
}

impl LoadPolicy {
    pub fn accepts(&self, process: &ProcessKey) -> bool {
        match self {
            LoadPolicy::All => true,
            LoadPolicy::Requested(keys) => keys.contains(process),
        }
    }
}

/// Outcome of [`SplineCache::load_all`](crate::spline::SplineCache::load_all).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    /// Rejected by the policy or already cached.
    pub skipped: usize,
}
