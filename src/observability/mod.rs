//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry / cache / driver produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stderr
//!     → Prometheus text snapshot written at the end of a run
//! ```

pub mod logging;
pub mod metrics;
