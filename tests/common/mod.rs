//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use xsec_splines::algorithm::{
    AlgorithmKey, AlgorithmRegistry, Capabilities, EnergyRange, EvaluationError, KinePoint,
    PhaseSpace, XSecModel,
};
use xsec_splines::config::{ConfigStore, DriverConfig, SplineSettings};
use xsec_splines::driver::Driver;
use xsec_splines::interaction::{Current, Pdg, ProcessClass, ProcessKey, ScatteringType};
use xsec_splines::spline::SplineCache;

pub const IRON: Pdg = 1000260560;
pub const COUNTING: &str = "test::CountingXSec";

/// Model for a single process class with `sigma(E) = E` that counts every
/// evaluation and remembers which processes it was asked about.
pub struct CountingModel {
    pub class: ProcessClass,
    /// Probes the model reports an error for.
    pub failing_probes: Vec<Pdg>,
    /// Probes the model panics on.
    pub panicking_probes: Vec<Pdg>,
    pub calls: AtomicUsize,
    pub processes: Mutex<HashSet<ProcessKey>>,
}

impl CountingModel {
    pub fn new(class: ProcessClass) -> Self {
        Self {
            class,
            failing_probes: Vec::new(),
            panicking_probes: Vec::new(),
            calls: AtomicUsize::new(0),
            processes: Mutex::new(HashSet::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn distinct_processes(&self) -> usize {
        self.processes.lock().unwrap().len()
    }
}

impl XSecModel for CountingModel {
    fn applies_to(&self, process: &ProcessKey) -> bool {
        process.process == self.class
    }

    fn validity(&self) -> EnergyRange {
        EnergyRange::new(0.1, 100.0)
    }

    fn phase_space(&self, _process: &ProcessKey, _energy: f64) -> PhaseSpace {
        PhaseSpace::default()
    }

    fn evaluate(&self, process: &ProcessKey, point: KinePoint<'_>) -> Result<f64, EvaluationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.processes.lock().unwrap().insert(*process);
        if self.failing_probes.contains(&process.probe) {
            return Err(EvaluationError::UnsupportedProcess(*process));
        }
        if self.panicking_probes.contains(&process.probe) {
            panic!("model bug for probe {}", process.probe);
        }
        Ok(point.energy)
    }

    fn total_xsec(&self, process: &ProcessKey, energy: f64) -> Result<f64, EvaluationError> {
        self.evaluate(process, KinePoint { energy, vars: &[] })
    }
}

pub fn cc_dis_on_proton() -> ProcessClass {
    ProcessClass {
        scattering: ScatteringType::DeepInelastic,
        current: Current::ChargedCurrent,
        hit_nucleon: Some(2212),
    }
}

pub fn nc_dis_on_proton() -> ProcessClass {
    ProcessClass {
        scattering: ScatteringType::DeepInelastic,
        current: Current::NeutralCurrent,
        hit_nucleon: Some(2212),
    }
}

/// A driver whose only generator is `model`.
pub fn counting_driver(model: Arc<CountingModel>, workers: usize) -> Driver {
    let mut registry = AlgorithmRegistry::new(Arc::new(ConfigStore::new()));
    registry.register(COUNTING, move |_ctx| Ok(Capabilities::new().xsec_model(model.clone())));
    let config = DriverConfig {
        generators: vec![AlgorithmKey::with_default(COUNTING)],
        workers,
    };
    Driver::new(registry, Arc::new(SplineCache::new(SplineSettings::default())), &config)
}

pub fn temp_path(name: &str, ext: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}-{}.{}", name, std::process::id(), ext))
}

pub fn cleanup(path: &PathBuf) {
    std::fs::remove_file(path).unwrap_or_default();
}
