//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (energies > 0, knot counts, worker count)
//! - Detect duplicate generators
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use thiserror::Error;

use crate::config::schema::AppConfig;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("splines.min_energy must be positive and finite (got {0})")]
    MinEnergy(f64),

    #[error("splines.knots_per_decade must be > 0")]
    KnotsPerDecade,

    #[error("splines.min_knots must be at least 2 (got {0})")]
    MinKnots(u32),

    #[error("driver.workers must be > 0")]
    Workers,

    #[error("driver.generators lists '{0}' more than once")]
    DuplicateGenerator(String),
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let splines = &config.splines;
    if !(splines.min_energy.is_finite() && splines.min_energy > 0.0) {
        errors.push(ValidationError::MinEnergy(splines.min_energy));
    }
    if splines.knots_per_decade == 0 {
        errors.push(ValidationError::KnotsPerDecade);
    }
    if splines.min_knots < 2 {
        errors.push(ValidationError::MinKnots(splines.min_knots));
    }
    if config.driver.workers == 0 {
        errors.push(ValidationError::Workers);
    }

    let mut seen = HashSet::new();
    for key in &config.driver.generators {
        if !seen.insert(key) {
            errors.push(ValidationError::DuplicateGenerator(key.to_string()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
