//! Diffractive pion production off a proton, differential in (x, y, t).
//!
//! Parameters: `Ma` (fallback global `DFR-Ma`), `beta` (fallback global
//! `DFR-Beta`), `MaxEnergy`, optional `MinEnergy`, and the integrator named
//! by `XSec-Integrator`.

use std::sync::Arc;

use crate::algorithm::builtin::{
    check_energy, check_point, GF2, MB_TO_GEV2, NUCLEON_MASS, PION_MASS,
};
use crate::algorithm::capability::{
    Bounds, Capabilities, EnergyRange, EvaluationError, KinePoint, PhaseSpace, XSecIntegrator,
    XSecModel,
};
use crate::algorithm::error::RegistryResult;
use crate::algorithm::registry::AlgorithmContext;
use crate::interaction::pdg::{self, Target, PROTON};
use crate::interaction::{Current, ProcessKey, ScatteringType};

/// Upper limit of |t| integration (GeV^2).
const T_MAX: f64 = 1.0;

pub struct DiffractiveModel {
    ma: f64,
    beta: f64,
    validity: EnergyRange,
    integrator: Arc<dyn XSecIntegrator>,
}

impl DiffractiveModel {
    pub const NAME: &'static str = "genie::ReinDFRPXSec";

    pub fn factory(ctx: &mut AlgorithmContext<'_>) -> RegistryResult<Capabilities> {
        let ma = ctx.f64_or_global("Ma", "DFR-Ma")?;
        let beta = ctx.f64_or_global("beta", "DFR-Beta")?;
        let validity = EnergyRange::new(ctx.f64_or("MinEnergy", 0.0)?, ctx.f64("MaxEnergy")?);
        if !(ma > 0.0) {
            return Err(ctx.invalid("Ma", "must be positive"));
        }
        let integrator = ctx.sub_integrator("XSec-Integrator")?;

        let model = Self {
            ma,
            beta,
            validity,
            integrator,
        };
        Ok(Capabilities::new().xsec_model(Arc::new(model)))
    }
}

impl XSecModel for DiffractiveModel {
    fn applies_to(&self, process: &ProcessKey) -> bool {
        process.process.scattering == ScatteringType::Diffractive
            && process.process.current != Current::Electromagnetic
            && process.process.hit_nucleon == Some(PROTON)
            && pdg::is_neutrino(process.probe)
    }

    fn validity(&self) -> EnergyRange {
        self.validity
    }

    fn phase_space(&self, _process: &ProcessKey, _energy: f64) -> PhaseSpace {
        PhaseSpace::new(vec![
            Bounds::new(0.0, 1.0),
            Bounds::new(0.0, 1.0),
            Bounds::new(0.0, T_MAX),
        ])
    }

    fn evaluate(&self, process: &ProcessKey, point: KinePoint<'_>) -> Result<f64, EvaluationError> {
        if !self.applies_to(process) {
            return Err(EvaluationError::UnsupportedProcess(*process));
        }
        check_energy(self.validity, point.energy)?;
        check_point(point, 3)?;

        let e = point.energy;
        let (x, y, t) = (point.vars[0], point.vars[1], point.vars[2]);
        let m = NUCLEON_MASS;

        let q2 = 2.0 * x * y * m * e;
        let gf = GF2 * m / (16.0 * std::f64::consts::PI.powi(3));
        let fp = 0.93 * PION_MASS;
        let e_pi = y * e;
        let s_tot = if e_pi > 0.0 {
            12.0 * (2.0 + 1.0 / e_pi.sqrt()) * MB_TO_GEV2
        } else {
            0.0
        };
        let ma2 = self.ma * self.ma;
        let propagator = (ma2 / (ma2 + q2)).powi(2);
        let t_factor = (-self.beta * t).exp();

        let mut xsec = gf * e * fp * fp * (1.0 - y) * propagator * s_tot * s_tot * t_factor;
        if process.process.current == Current::NeutralCurrent {
            xsec *= 0.5;
        }

        let protons = Target::from_pdg(process.target)
            .map(|target| target.nucleon_count(PROTON))
            .unwrap_or(1);
        Ok(xsec * protons as f64)
    }

    fn total_xsec(&self, process: &ProcessKey, energy: f64) -> Result<f64, EvaluationError> {
        check_energy(self.validity, energy)?;
        self.integrator.integrate(self, process, energy)
    }
}
