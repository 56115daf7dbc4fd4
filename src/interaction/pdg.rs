//! Particle identity codes.
//!
//! Probes are plain PDG codes. Targets are either a free nucleon (2212/2112)
//! or a nucleus in the `10LZZZAAAI` form, e.g. `1000260560` for iron-56.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A PDG particle code.
pub type Pdg = i32;

pub const PROTON: Pdg = 2212;
pub const NEUTRON: Pdg = 2112;

pub const NU_E: Pdg = 12;
pub const NU_MU: Pdg = 14;
pub const NU_TAU: Pdg = 16;
pub const ELECTRON: Pdg = 11;
pub const MUON: Pdg = 13;

/// Returns true for (anti)neutrinos of any flavour.
pub fn is_neutrino(pdg: Pdg) -> bool {
    matches!(pdg.abs(), NU_E | NU_MU | NU_TAU)
}

/// Returns true for electrons, muons and their antiparticles.
pub fn is_charged_lepton(pdg: Pdg) -> bool {
    matches!(pdg.abs(), ELECTRON | MUON)
}

/// Returns true for probes the interaction lists know about.
pub fn is_probe(pdg: Pdg) -> bool {
    is_neutrino(pdg) || is_charged_lepton(pdg)
}

/// A decoded scattering target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Target {
    pub pdg: Pdg,
    pub z: u32,
    pub a: u32,
}

impl Target {
    /// Decode a target code. Returns `None` for codes that are neither a free
    /// nucleon nor a well-formed nucleus code.
    pub fn from_pdg(pdg: Pdg) -> Option<Self> {
        match pdg {
            PROTON => return Some(Self { pdg, z: 1, a: 1 }),
            NEUTRON => return Some(Self { pdg, z: 0, a: 1 }),
            _ => {}
        }

        // 10LZZZAAAI
        if !(1_000_000_000..1_100_000_000).contains(&pdg) {
            return None;
        }
        let a = ((pdg / 10) % 1000) as u32;
        let z = ((pdg / 10_000) % 1000) as u32;
        if a == 0 || z > a {
            return None;
        }
        Some(Self { pdg, z, a })
    }

    /// Neutron count.
    pub fn n(&self) -> u32 {
        self.a - self.z
    }

    pub fn is_nucleus(&self) -> bool {
        self.a > 1
    }

    pub fn has_protons(&self) -> bool {
        self.z > 0
    }

    pub fn has_neutrons(&self) -> bool {
        self.n() > 0
    }

    /// Number of scattering centres of the given nucleon species.
    pub fn nucleon_count(&self, nucleon: Pdg) -> u32 {
        if nucleon == PROTON {
            self.z
        } else {
            self.n()
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(Z={},A={})", self.pdg, self.z, self.a)
    }
}

/// A (probe, target) pair a driver is asked to prepare splines for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InitialState {
    pub probe: Pdg,
    pub target: Target,
}

impl InitialState {
    pub fn new(probe: Pdg, target: Target) -> Self {
        Self { probe, target }
    }
}

impl fmt::Display for InitialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "probe={} target={}", self.probe, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_iron() {
        let fe = Target::from_pdg(1000260560).unwrap();
        assert_eq!(fe.z, 26);
        assert_eq!(fe.a, 56);
        assert_eq!(fe.n(), 30);
        assert!(fe.is_nucleus());
    }

    #[test]
    fn test_decode_free_nucleons() {
        let p = Target::from_pdg(PROTON).unwrap();
        assert!(p.has_protons());
        assert!(!p.has_neutrons());
        assert!(!p.is_nucleus());

        let n = Target::from_pdg(NEUTRON).unwrap();
        assert!(n.has_neutrons());
        assert!(!n.has_protons());
    }

    #[test]
    fn test_reject_malformed_codes() {
        assert!(Target::from_pdg(14).is_none());
        assert!(Target::from_pdg(1000000000).is_none());
        // Z > A
        assert!(Target::from_pdg(1000260100).is_none());
    }

    #[test]
    fn test_probe_classification() {
        assert!(is_neutrino(-14));
        assert!(is_charged_lepton(13));
        assert!(!is_probe(2212));
    }
}
