//! Capability interfaces and the configured algorithm instance.
//!
//! An algorithm declares the capabilities it provides when it is built. A
//! consumer asks for the capability it needs (`xsec_model()`,
//! `integrator()`) instead of checking concrete types.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::algorithm::key::AlgorithmKey;
use crate::interaction::ProcessKey;

/// Energy interval (GeV) an algorithm is valid in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyRange {
    pub min: f64,
    pub max: f64,
}

impl EnergyRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, energy: f64) -> bool {
        energy >= self.min && energy <= self.max
    }
}

/// Integration limits of one kinematic variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lo: f64,
    pub hi: f64,
}

impl Bounds {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }
}

/// Box-shaped phase space remaining once the energy is fixed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseSpace {
    pub dims: Vec<Bounds>,
}

impl PhaseSpace {
    pub fn new(dims: Vec<Bounds>) -> Self {
        Self { dims }
    }

    /// True when some dimension has no extent (e.g. below threshold).
    pub fn is_closed(&self) -> bool {
        self.dims.iter().any(|b| !(b.width() > 0.0))
    }
}

/// A single kinematic point at fixed probe energy.
#[derive(Debug, Clone, Copy)]
pub struct KinePoint<'a> {
    pub energy: f64,
    pub vars: &'a [f64],
}

/// Failure of a single evaluation or integration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("energy {energy} GeV outside validity range [{min}, {max}]")]
    OutOfDomain { energy: f64, min: f64, max: f64 },

    #[error("process {0} is not handled by this model")]
    UnsupportedProcess(ProcessKey),

    #[error("expected {expected} kinematic variables, got {got}")]
    Dimension { expected: usize, got: usize },

    #[error("non-finite result {value} at energy {energy} GeV")]
    NonFinite { energy: f64, value: f64 },

    #[error("negative cross section {value} at energy {energy} GeV")]
    Negative { energy: f64, value: f64 },
}

/// Evaluates a differential cross section and its integral.
pub trait XSecModel: Send + Sync {
    /// Does this model know how to evaluate this process.
    fn applies_to(&self, process: &ProcessKey) -> bool;

    fn validity(&self) -> EnergyRange;

    /// Variables `evaluate` expects, and their limits at `energy`.
    fn phase_space(&self, process: &ProcessKey, energy: f64) -> PhaseSpace;

    /// Differential cross section at one kinematic point.
    fn evaluate(&self, process: &ProcessKey, point: KinePoint<'_>) -> Result<f64, EvaluationError>;

    /// Cross section at `energy` with the remaining dimensions integrated out.
    fn total_xsec(&self, process: &ProcessKey, energy: f64) -> Result<f64, EvaluationError>;
}

/// Integrates a model over its phase space at fixed energy.
pub trait XSecIntegrator: Send + Sync {
    fn integrate(
        &self,
        model: &dyn XSecModel,
        process: &ProcessKey,
        energy: f64,
    ) -> Result<f64, EvaluationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    XSecModel,
    Integrator,
}

/// One provided capability.
#[derive(Clone)]
pub enum Capability {
    XSecModel(Arc<dyn XSecModel>),
    Integrator(Arc<dyn XSecIntegrator>),
}

impl Capability {
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Capability::XSecModel(_) => CapabilityKind::XSecModel,
            Capability::Integrator(_) => CapabilityKind::Integrator,
        }
    }
}

/// The set of capabilities an algorithm factory returns.
#[derive(Clone, Default)]
pub struct Capabilities(Vec<Capability>);

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn xsec_model(mut self, model: Arc<dyn XSecModel>) -> Self {
        self.0.push(Capability::XSecModel(model));
        self
    }

    pub fn integrator(mut self, integrator: Arc<dyn XSecIntegrator>) -> Self {
        self.0.push(Capability::Integrator(integrator));
        self
    }

    pub fn kinds(&self) -> Vec<CapabilityKind> {
        self.0.iter().map(Capability::kind).collect()
    }
}

/// A configured, fully wired algorithm instance. Shared as `Arc<Algorithm>`.
pub struct Algorithm {
    key: AlgorithmKey,
    capabilities: Capabilities,
    dependencies: Vec<AlgorithmKey>,
}

impl Algorithm {
    pub fn new(key: AlgorithmKey, capabilities: Capabilities, dependencies: Vec<AlgorithmKey>) -> Self {
        Self {
            key,
            capabilities,
            dependencies,
        }
    }

    pub fn key(&self) -> &AlgorithmKey {
        &self.key
    }

    /// Keys of the sub-algorithms this instance resolved while being built.
    pub fn dependencies(&self) -> &[AlgorithmKey] {
        &self.dependencies
    }

    pub fn provides(&self, kind: CapabilityKind) -> bool {
        self.capabilities.0.iter().any(|c| c.kind() == kind)
    }

    pub fn xsec_model(&self) -> Option<Arc<dyn XSecModel>> {
        self.capabilities.0.iter().find_map(|c| match c {
            Capability::XSecModel(m) => Some(m.clone()),
            _ => None,
        })
    }

    pub fn integrator(&self) -> Option<Arc<dyn XSecIntegrator>> {
        self.capabilities.0.iter().find_map(|c| match c {
            Capability::Integrator(i) => Some(i.clone()),
            _ => None,
        })
    }
}

impl fmt::Debug for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Algorithm")
            .field("key", &self.key)
            .field("capabilities", &self.capabilities.kinds())
            .field("dependencies", &self.dependencies)
            .finish()
    }
}
