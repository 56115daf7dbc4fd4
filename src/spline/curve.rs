//! Immutable sampled function of energy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One `(energy, value)` sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Knot {
    pub energy: f64,
    pub value: f64,
}

impl Knot {
    pub fn new(energy: f64, value: f64) -> Self {
        Self { energy, value }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KnotError {
    #[error("a spline needs at least 2 knots, got {0}")]
    TooFew(usize),

    #[error("knot {index}: energy {energy} is not strictly above the previous knot")]
    NotIncreasing { index: usize, energy: f64 },

    #[error("knot {index}: energy {energy} is not finite")]
    BadEnergy { index: usize, energy: f64 },

    #[error("knot {index}: value {value} is negative or not finite")]
    BadValue { index: usize, value: f64 },
}

/// Interpolating tabulation of a non-negative function of energy.
///
/// Knot energies are strictly increasing and values are finite and `>= 0`.
/// Between knots the spline interpolates linearly; outside
/// `[min_energy, max_energy]` it evaluates to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Knot>", into = "Vec<Knot>")]
pub struct Spline {
    knots: Vec<Knot>,
}

impl Spline {
    pub fn from_knots(knots: Vec<Knot>) -> Result<Self, KnotError> {
        if knots.len() < 2 {
            return Err(KnotError::TooFew(knots.len()));
        }
        for (index, knot) in knots.iter().enumerate() {
            if !knot.energy.is_finite() {
                return Err(KnotError::BadEnergy {
                    index,
                    energy: knot.energy,
                });
            }
            if !(knot.value.is_finite() && knot.value >= 0.0) {
                return Err(KnotError::BadValue {
                    index,
                    value: knot.value,
                });
            }
            if index > 0 && knot.energy <= knots[index - 1].energy {
                return Err(KnotError::NotIncreasing {
                    index,
                    energy: knot.energy,
                });
            }
        }
        Ok(Self { knots })
    }

    pub fn knots(&self) -> &[Knot] {
        &self.knots
    }

    pub fn len(&self) -> usize {
        self.knots.len()
    }

    /// Always false; kept for the `len` convention.
    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    pub fn min_energy(&self) -> f64 {
        self.knots[0].energy
    }

    pub fn max_energy(&self) -> f64 {
        self.knots[self.knots.len() - 1].energy
    }

    /// Value at `energy`. Zero outside the knot range.
    pub fn evaluate(&self, energy: f64) -> f64 {
        if !(energy >= self.min_energy() && energy <= self.max_energy()) {
            return 0.0;
        }

        // first knot strictly above `energy`
        let upper = self.knots.partition_point(|k| k.energy <= energy);
        if upper == self.knots.len() {
            return self.knots[upper - 1].value;
        }
        let lo = self.knots[upper - 1];
        let hi = self.knots[upper];
        let frac = (energy - lo.energy) / (hi.energy - lo.energy);
        lo.value + frac * (hi.value - lo.value)
    }
}

impl TryFrom<Vec<Knot>> for Spline {
    type Error = KnotError;

    fn try_from(knots: Vec<Knot>) -> Result<Self, Self::Error> {
        Self::from_knots(knots)
    }
}

impl From<Spline> for Vec<Knot> {
    fn from(spline: Spline) -> Self {
        spline.knots
    }
}
