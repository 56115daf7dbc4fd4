//! Metrics collection and exposition.
//!
//! # Metrics
//! - `xsec_spline_builds_total` (counter): splines built, by algorithm
//! - `xsec_spline_reused_total` (counter): requests served from the cache
//! - `xsec_spline_build_failures_total` (counter): aborted builds, by algorithm
//! - `xsec_splines_loaded_total` (counter): splines read from a table
//! - `xsec_spline_cache_size` (gauge): splines currently cached
//! - `xsec_spline_build_seconds` (histogram): wall time per build
//! - `xsec_spline_knots` (histogram): knots per built spline
//! - `xsec_algorithms_resolved_total` (counter): algorithm instances built, by name
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - A batch run has no scrape endpoint; the rendered text is written once
//!   at the end of the run

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::Path;
use std::time::Instant;

/// Install the Prometheus recorder. Returns `None` if one is already set.
pub fn init_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            tracing::info!("Metrics recorder installed");
            Some(handle)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics recorder");
            None
        }
    }
}

/// Write the current metrics in Prometheus text format.
pub fn write_snapshot(handle: &PrometheusHandle, path: &Path) -> std::io::Result<()> {
    std::fs::write(path, handle.render())?;
    tracing::info!(path = %path.display(), "Metrics written");
    Ok(())
}

pub fn record_spline_built(algorithm: &str, knots: usize, started: Instant) {
    metrics::counter!("xsec_spline_builds_total", "algorithm" => algorithm.to_string()).increment(1);
    metrics::histogram!("xsec_spline_build_seconds").record(started.elapsed().as_secs_f64());
    metrics::histogram!("xsec_spline_knots").record(knots as f64);
}

pub fn record_spline_reused() {
    metrics::counter!("xsec_spline_reused_total").increment(1);
}

pub fn record_build_failure(algorithm: &str) {
    metrics::counter!("xsec_spline_build_failures_total", "algorithm" => algorithm.to_string())
        .increment(1);
}

pub fn record_splines_loaded(count: usize) {
    metrics::counter!("xsec_splines_loaded_total").increment(count as u64);
}

pub fn record_cache_size(size: usize) {
    metrics::gauge!("xsec_spline_cache_size").set(size as f64);
}

pub fn record_algorithm_resolved(name: &str) {
    metrics::counter!("xsec_algorithms_resolved_total", "algorithm" => name.to_string()).increment(1);
}
