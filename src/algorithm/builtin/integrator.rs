//! Composite midpoint-rule integrator over a model's phase-space box.

use std::sync::Arc;

use crate::algorithm::capability::{
    Capabilities, EvaluationError, KinePoint, XSecIntegrator, XSecModel,
};
use crate::algorithm::error::RegistryResult;
use crate::algorithm::registry::AlgorithmContext;
use crate::interaction::ProcessKey;

/// Upper bound on points per dimension, to keep a mistyped config from
/// turning one knot into hours of work.
const MAX_POINTS: i64 = 1000;

#[derive(Debug, Clone)]
pub struct GridIntegrator {
    points_per_dim: usize,
}

impl GridIntegrator {
    pub const NAME: &'static str = "genie::GridIntegrator";

    pub fn new(points_per_dim: usize) -> Self {
        Self {
            points_per_dim: points_per_dim.max(1),
        }
    }

    pub fn factory(ctx: &mut AlgorithmContext<'_>) -> RegistryResult<Capabilities> {
        let n = ctx.i64_or_global("NPoints", "Integrator-NPoints")?;
        if !(1..=MAX_POINTS).contains(&n) {
            return Err(ctx.invalid("NPoints", format!("must be in 1..={MAX_POINTS}, got {n}")));
        }
        Ok(Capabilities::new().integrator(Arc::new(Self::new(n as usize))))
    }
}

impl XSecIntegrator for GridIntegrator {
    fn integrate(
        &self,
        model: &dyn XSecModel,
        process: &ProcessKey,
        energy: f64,
    ) -> Result<f64, EvaluationError> {
        let space = model.phase_space(process, energy);
        if space.is_closed() {
            return Ok(0.0);
        }

        let n = self.points_per_dim;
        let dims = space.dims.len();
        let steps: Vec<f64> = space.dims.iter().map(|b| b.width() / n as f64).collect();
        let cell: f64 = steps.iter().product();

        let mut index = vec![0usize; dims];
        let mut vars = vec![0.0; dims];
        let mut sum = 0.0;

        loop {
            for d in 0..dims {
                vars[d] = space.dims[d].lo + (index[d] as f64 + 0.5) * steps[d];
            }
            sum += model.evaluate(process, KinePoint { energy, vars: &vars })?;

            // odometer increment over the grid
            let mut d = 0;
            loop {
                if d == dims {
                    let total = sum * cell;
                    if !total.is_finite() {
                        return Err(EvaluationError::NonFinite { energy, value: total });
                    }
                    return Ok(total);
                }
                index[d] += 1;
                if index[d] < n {
                    break;
                }
                index[d] = 0;
                d += 1;
            }
        }
    }
}
