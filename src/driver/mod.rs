//! Batch driver.
//!
//! # Data Flow
//! ```text
//! probes + (target codes | GeometrySource)
//!     → runner.rs input checks (EmptyInputSet, NoTargetSource, ...)
//!     → plan: generators resolved once, reachable processes per InitialState
//!     → optional preload of a saved table (LoadPolicy)
//!     → SplineCache::get_or_build on blocking workers (Semaphore-bounded)
//!     → SplineCache::save_all, exactly once
//!     → RunReport
//! ```

pub mod error;
pub mod geometry;
pub mod runner;

pub use error::{DriverError, DriverResult, GeometryError, GeometryResult, InputSet};
pub use geometry::{GeometrySource, MaterialFile, StaticGeometry};
pub use runner::{check_knots, resolve_probes, resolve_targets, BuildFailure, Driver, PlannedSpline, RunReport, RunRequest};
