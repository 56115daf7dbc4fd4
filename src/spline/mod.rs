//! Spline subsystem.
//!
//! # Data Flow
//! ```text
//! (ProcessKey, Algorithm, BuildRequest)
//!     → cache.rs (hit? return shared spline)
//!     → knot grid: E_min = max(min_energy, validity.min)
//!                  E_max = min(requested max, validity.max)
//!     → XSecModel::total_xsec at every knot (any failure aborts)
//!     → curve.rs Spline, cached under the key
//!
//! save_all → table.rs JSON ← load_all (LoadPolicy)
//! ```

pub mod cache;
pub mod curve;
pub mod error;
pub mod table;

pub use cache::{
    knot_count, knot_energies, strictly_increasing, BuildRequest, CachedSpline, SplineCache, MAX_KNOTS,
};
pub use curve::{Knot, KnotError, Spline};
pub use error::{SplineError, SplineResult};
pub use table::{LoadPolicy, LoadReport, SplineRecord, SplineTable, TABLE_VERSION};
