//! Scaling deep-inelastic model, differential in (x, y).
//!
//! `F2(x) = norm * x^a * (1 - x)^b`, with `F2-Norm`, `F2-a`, `F2-b` falling
//! back to global `DIS-F2-Norm`, `DIS-F2-a`, `DIS-F2-b`.

use std::sync::Arc;

use crate::algorithm::builtin::{check_energy, check_point, GF2, NUCLEON_MASS};
use crate::algorithm::capability::{
    Bounds, Capabilities, EnergyRange, EvaluationError, KinePoint, PhaseSpace, XSecIntegrator,
    XSecModel,
};
use crate::algorithm::error::RegistryResult;
use crate::algorithm::registry::AlgorithmContext;
use crate::interaction::pdg::{self, Target};
use crate::interaction::{Current, ProcessKey, ScatteringType};

/// Relative strength of the neutral current.
const NC_RATIO: f64 = 0.3;

pub struct ScalingDisModel {
    norm: f64,
    a: f64,
    b: f64,
    validity: EnergyRange,
    integrator: Arc<dyn XSecIntegrator>,
}

impl ScalingDisModel {
    pub const NAME: &'static str = "genie::ScalingDISPXSec";

    pub fn factory(ctx: &mut AlgorithmContext<'_>) -> RegistryResult<Capabilities> {
        let norm = ctx.f64_or_global("F2-Norm", "DIS-F2-Norm")?;
        let a = ctx.f64_or_global("F2-a", "DIS-F2-a")?;
        let b = ctx.f64_or_global("F2-b", "DIS-F2-b")?;
        if norm < 0.0 {
            return Err(ctx.invalid("F2-Norm", "must not be negative"));
        }
        if a <= -1.0 {
            return Err(ctx.invalid("F2-a", "exponent must be > -1"));
        }
        if b <= -1.0 {
            return Err(ctx.invalid("F2-b", "exponent must be > -1"));
        }
        let validity = EnergyRange::new(ctx.f64_or("MinEnergy", 0.0)?, ctx.f64("MaxEnergy")?);
        let integrator = ctx.sub_integrator("XSec-Integrator")?;

        let model = Self {
            norm,
            a,
            b,
            validity,
            integrator,
        };
        Ok(Capabilities::new().xsec_model(Arc::new(model)))
    }

    fn f2(&self, x: f64) -> f64 {
        self.norm * x.powf(self.a) * (1.0 - x).powf(self.b)
    }
}

impl XSecModel for ScalingDisModel {
    fn applies_to(&self, process: &ProcessKey) -> bool {
        process.process.scattering == ScatteringType::DeepInelastic
            && process.process.current != Current::Electromagnetic
            && process.process.hit_nucleon.is_some()
            && pdg::is_neutrino(process.probe)
    }

    fn validity(&self) -> EnergyRange {
        self.validity
    }

    fn phase_space(&self, _process: &ProcessKey, _energy: f64) -> PhaseSpace {
        PhaseSpace::new(vec![Bounds::new(0.0, 1.0), Bounds::new(0.0, 1.0)])
    }

    fn evaluate(&self, process: &ProcessKey, point: KinePoint<'_>) -> Result<f64, EvaluationError> {
        if !self.applies_to(process) {
            return Err(EvaluationError::UnsupportedProcess(*process));
        }
        check_energy(self.validity, point.energy)?;
        check_point(point, 2)?;

        let (x, y) = (point.vars[0], point.vars[1]);
        let e = point.energy;

        // antineutrinos see the (1-y)^2 helicity suppression
        let y_shape = if process.probe > 0 {
            1.0 - y + 0.5 * y * y
        } else {
            0.5 * (1.0 - y) * (1.0 - y)
        };
        let coupling = match process.process.current {
            Current::NeutralCurrent => GF2 * NC_RATIO,
            _ => GF2,
        };

        let xsec = coupling * NUCLEON_MASS * e / std::f64::consts::PI * self.f2(x) * y_shape;

        let centres = match (process.process.hit_nucleon, Target::from_pdg(process.target)) {
            (Some(nucleon), Some(target)) => target.nucleon_count(nucleon),
            _ => 1,
        };
        Ok(xsec * centres as f64)
    }

    fn total_xsec(&self, process: &ProcessKey, energy: f64) -> Result<f64, EvaluationError> {
        check_energy(self.validity, energy)?;
        self.integrator.integrate(self, process, energy)
    }
}
