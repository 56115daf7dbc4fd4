//! Cross-section spline builder library.
//!
//! # Architecture Overview
//!
//! ```text
//!   config (TOML layers) ──▶ ConfigStore ──▶ AlgorithmRegistry ──▶ Algorithm
//!                                                                    │
//!   probes, targets | geometry ──▶ driver ──▶ SplineCache ◀──────────┘
//!                                                │
//!                                                ▼
//!                                        JSON spline table
//! ```

pub mod algorithm;
pub mod config;
pub mod driver;
pub mod interaction;
pub mod observability;
pub mod spline;

pub use algorithm::{Algorithm, AlgorithmKey, AlgorithmRegistry};
pub use config::{AppConfig, ConfigStore};
pub use driver::{Driver, DriverError, RunReport, RunRequest};
pub use interaction::ProcessKey;
pub use spline::{Spline, SplineCache};
