//! Spline build and persistence errors.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::algorithm::{AlgorithmKey, EvaluationError};
use crate::interaction::ProcessKey;
use crate::spline::curve::KnotError;

/// Cloneable so a failed build can be handed to every caller waiting on it.
#[derive(Debug, Clone, Error)]
pub enum SplineError {
    /// The usable energy range is empty.
    #[error("Empty energy domain for {process}: max {max} GeV <= min {min} GeV")]
    EmptyDomain { process: ProcessKey, min: f64, max: f64 },

    /// The algorithm failed at one knot; the whole build is abandoned.
    #[error("Evaluation failed for {process} ({algorithm}) at {energy} GeV: {source}")]
    EvaluationFailure {
        process: ProcessKey,
        algorithm: AlgorithmKey,
        energy: f64,
        #[source]
        source: EvaluationError,
    },

    /// The model panicked while the spline was being built.
    #[error("Model {algorithm} panicked while building {process}: {message}")]
    Panicked {
        process: ProcessKey,
        algorithm: AlgorithmKey,
        message: String,
    },

    /// The domain cannot hold the requested number of distinct knots.
    #[error("Energy range [{min}, {max}] GeV of {process} is too narrow for {knots} knots")]
    NarrowDomain {
        process: ProcessKey,
        min: f64,
        max: f64,
        knots: usize,
    },

    #[error("{0} does not provide a cross-section model")]
    NotAModel(AlgorithmKey),

    #[error("Invalid knots: {0}")]
    InvalidKnots(#[from] KnotError),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("Malformed spline table {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: Arc<serde_json::Error>,
    },

    #[error("Unsupported spline table version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
}

/// Result type for spline operations.
pub type SplineResult<T> = Result<T, SplineError>;
