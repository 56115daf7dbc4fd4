//! Process classification and the cache key built from it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::interaction::pdg::{self, InitialState, Pdg, NEUTRON, PROTON};

/// Scattering mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScatteringType {
    QuasiElastic,
    Resonant,
    DeepInelastic,
    Coherent,
    Diffractive,
}

impl ScatteringType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScatteringType::QuasiElastic => "QEL",
            ScatteringType::Resonant => "RES",
            ScatteringType::DeepInelastic => "DIS",
            ScatteringType::Coherent => "COH",
            ScatteringType::Diffractive => "DFR",
        }
    }
}

/// Exchanged current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Current {
    ChargedCurrent,
    NeutralCurrent,
    Electromagnetic,
}

impl Current {
    pub fn as_str(&self) -> &'static str {
        match self {
            Current::ChargedCurrent => "CC",
            Current::NeutralCurrent => "NC",
            Current::Electromagnetic => "EM",
        }
    }
}

/// Process classification: mechanism, current and struck nucleon.
///
/// `hit_nucleon` is `None` for processes off the nucleus as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcessClass {
    pub scattering: ScatteringType,
    pub current: Current,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_nucleon: Option<Pdg>,
}

impl fmt::Display for ProcessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.current.as_str(), self.scattering.as_str())?;
        if let Some(n) = self.hit_nucleon {
            write!(f, ";N:{}", n)?;
        }
        Ok(())
    }
}

/// Identifies one spline: who scatters, off what, and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcessKey {
    pub probe: Pdg,
    pub target: Pdg,
    pub process: ProcessClass,
}

impl ProcessKey {
    pub fn new(probe: Pdg, target: Pdg, process: ProcessClass) -> Self {
        Self { probe, target, process }
    }
}

impl fmt::Display for ProcessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "probe:{};tgt:{};proc:{}", self.probe, self.target, self.process)
    }
}

/// Enumerate every process reachable from an initial state.
///
/// The list is deterministic: the same initial state always yields the same
/// keys in the same order.
pub fn reachable_processes(init: &InitialState) -> Vec<ProcessKey> {
    let target = init.target;
    let mut nucleons = Vec::with_capacity(2);
    if target.has_protons() {
        nucleons.push(PROTON);
    }
    if target.has_neutrons() {
        nucleons.push(NEUTRON);
    }

    let mut classes = Vec::new();
    if pdg::is_neutrino(init.probe) {
        for current in [Current::ChargedCurrent, Current::NeutralCurrent] {
            for scattering in [
                ScatteringType::QuasiElastic,
                ScatteringType::Resonant,
                ScatteringType::DeepInelastic,
            ] {
                for &nucleon in &nucleons {
                    classes.push(ProcessClass {
                        scattering,
                        current,
                        hit_nucleon: Some(nucleon),
                    });
                }
            }
            if target.is_nucleus() {
                classes.push(ProcessClass {
                    scattering: ScatteringType::Coherent,
                    current,
                    hit_nucleon: None,
                });
            }
            if target.has_protons() {
                classes.push(ProcessClass {
                    scattering: ScatteringType::Diffractive,
                    current,
                    hit_nucleon: Some(PROTON),
                });
            }
        }
    } else if pdg::is_charged_lepton(init.probe) {
        for &nucleon in &nucleons {
            classes.push(ProcessClass {
                scattering: ScatteringType::DeepInelastic,
                current: Current::Electromagnetic,
                hit_nucleon: Some(nucleon),
            });
        }
    }

    classes
        .into_iter()
        .map(|process| ProcessKey::new(init.probe, target.pdg, process))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::pdg::Target;

    #[test]
    fn test_free_proton_has_no_coherent() {
        let init = InitialState::new(14, Target::from_pdg(PROTON).unwrap());
        let keys = reachable_processes(&init);
        assert!(keys
            .iter()
            .all(|k| k.process.scattering != ScatteringType::Coherent));
        assert!(keys
            .iter()
            .all(|k| k.process.hit_nucleon != Some(NEUTRON)));
        assert!(keys
            .iter()
            .any(|k| k.process.scattering == ScatteringType::Diffractive));
    }

    #[test]
    fn test_iron_enumeration() {
        let init = InitialState::new(-14, Target::from_pdg(1000260560).unwrap());
        let keys = reachable_processes(&init);
        // 2 currents x (3 mechanisms x 2 nucleons + COH + DFR)
        assert_eq!(keys.len(), 16);
        assert!(keys.iter().all(|k| k.probe == -14 && k.target == 1000260560));

        let again = reachable_processes(&init);
        assert_eq!(keys, again);
    }

    #[test]
    fn test_charged_lepton_is_em_only() {
        let init = InitialState::new(11, Target::from_pdg(1000060120).unwrap());
        let keys = reachable_processes(&init);
        assert_eq!(keys.len(), 2);
        assert!(keys
            .iter()
            .all(|k| k.process.current == Current::Electromagnetic));
    }

    #[test]
    fn test_display() {
        let key = ProcessKey::new(
            14,
            1000260560,
            ProcessClass {
                scattering: ScatteringType::DeepInelastic,
                current: Current::ChargedCurrent,
                hit_nucleon: Some(PROTON),
            },
        );
        assert_eq!(key.to_string(), "probe:14;tgt:1000260560;proc:CC-DIS;N:2212");
    }
}
