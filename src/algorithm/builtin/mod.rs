//! Built-in algorithms.
//!
//! Small reference models so a default run produces splines. Real models are
//! added through [`AlgorithmRegistry::register`].

pub mod diffractive;
pub mod dis;
pub mod integrator;

use crate::algorithm::capability::{EnergyRange, EvaluationError, KinePoint};
use crate::algorithm::registry::AlgorithmRegistry;

pub use diffractive::DiffractiveModel;
pub use dis::ScalingDisModel;
pub use integrator::GridIntegrator;

/// Fermi constant squared (GeV^-4).
pub(crate) const GF2: f64 = 1.166_378_7e-5 * 1.166_378_7e-5;
pub(crate) const NUCLEON_MASS: f64 = 0.938_272;
pub(crate) const PION_MASS: f64 = 0.139_570;
/// 1 mb in GeV^-2.
pub(crate) const MB_TO_GEV2: f64 = 2.567_7;

/// Register every built-in factory.
pub fn register_all(registry: &mut AlgorithmRegistry) {
    registry.register(GridIntegrator::NAME, GridIntegrator::factory);
    registry.register(DiffractiveModel::NAME, DiffractiveModel::factory);
    registry.register(ScalingDisModel::NAME, ScalingDisModel::factory);
}

pub(crate) fn check_energy(validity: EnergyRange, energy: f64) -> Result<(), EvaluationError> {
    if validity.contains(energy) {
        Ok(())
    } else {
        Err(EvaluationError::OutOfDomain {
            energy,
            min: validity.min,
            max: validity.max,
        })
    }
}

pub(crate) fn check_point(point: KinePoint<'_>, expected: usize) -> Result<(), EvaluationError> {
    if point.vars.len() == expected {
        Ok(())
    } else {
        Err(EvaluationError::Dimension {
            expected,
            got: point.vars.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{AlgorithmKey, RegistryError};
    use crate::config::{load_str, ConfigStore};
    use crate::interaction::{reachable_processes, InitialState, Target};
    use std::sync::Arc;

    fn registry() -> AlgorithmRegistry {
        let config = load_str("").unwrap();
        AlgorithmRegistry::with_builtins(Arc::new(ConfigStore::from_entries(config.algorithms)))
    }

    #[test]
    fn test_default_generators_resolve() {
        let mut registry = registry();
        let dfr = registry
            .resolve(&AlgorithmKey::with_default(DiffractiveModel::NAME))
            .unwrap();
        let dis = registry
            .resolve(&AlgorithmKey::with_default(ScalingDisModel::NAME))
            .unwrap();

        // both share the one integrator instance
        assert_eq!(dfr.dependencies(), dis.dependencies());
        assert_eq!(registry.len(), 3);
        assert!(dfr.xsec_model().is_some());
        assert!(dfr.integrator().is_none());
    }

    #[test]
    fn test_models_give_positive_totals_for_applicable_processes() {
        let mut registry = registry();
        let dis = registry
            .resolve(&AlgorithmKey::with_default(ScalingDisModel::NAME))
            .unwrap()
            .xsec_model()
            .unwrap();

        let init = InitialState::new(14, Target::from_pdg(1000260560).unwrap());
        let applicable: Vec<_> = reachable_processes(&init)
            .into_iter()
            .filter(|p| dis.applies_to(p))
            .collect();
        // CC + NC on protons and neutrons
        assert_eq!(applicable.len(), 4);

        for process in &applicable {
            let low = dis.total_xsec(process, 1.0).unwrap();
            let high = dis.total_xsec(process, 10.0).unwrap();
            assert!(low > 0.0);
            assert!(high > low);
        }
    }

    fn dis_error(layer: &str) -> RegistryError {
        let config = load_str(layer).unwrap();
        let mut registry =
            AlgorithmRegistry::with_builtins(Arc::new(ConfigStore::from_entries(config.algorithms)));
        registry
            .resolve(&AlgorithmKey::with_default(ScalingDisModel::NAME))
            .unwrap_err()
    }

    #[test]
    fn test_bad_exponent_names_its_parameter() {
        let err = dis_error("[algorithms.\"genie::ScalingDISPXSec/Default\"]\nF2-b = -2.0\n");
        assert!(matches!(err, RegistryError::InvalidParameter { ref param, .. } if param == "F2-b"));

        let err = dis_error("[algorithms.\"genie::ScalingDISPXSec/Default\"]\nF2-a = -1.5\n");
        assert!(matches!(err, RegistryError::InvalidParameter { ref param, .. } if param == "F2-a"));
    }

    #[test]
    fn test_outside_validity_is_an_error() {
        let mut registry = registry();
        let dfr = registry
            .resolve(&AlgorithmKey::with_default(DiffractiveModel::NAME))
            .unwrap()
            .xsec_model()
            .unwrap();
        let init = InitialState::new(14, Target::from_pdg(2212).unwrap());
        let process = reachable_processes(&init)
            .into_iter()
            .find(|p| dfr.applies_to(p))
            .unwrap();

        assert!(matches!(
            dfr.total_xsec(&process, 1.0e6),
            Err(EvaluationError::OutOfDomain { .. })
        ));
    }
}
