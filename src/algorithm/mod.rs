//! Algorithm subsystem.
//!
//! # Data Flow
//! ```text
//! AlgorithmKey (name/config)
//!     → registry.rs (cache hit? return shared Arc)
//!     → factory for `name` runs with an AlgorithmContext
//!         ├─ reads parameters from ConfigStore scope `name/config` (→ global)
//!         └─ resolves sub-algorithms by parameter (recursive, cycle-checked)
//!     → Algorithm { key, capabilities, dependencies } cached and returned
//! ```
//!
//! # Design Decisions
//! - Consumers ask for a capability (`XSecModel`, `XSecIntegrator`)
//! - Factories live in an explicit table populated at startup
//! - Config store is injected, not global

pub mod builtin;
pub mod capability;
pub mod error;
pub mod key;
pub mod registry;

pub use capability::{
    Algorithm, Bounds, Capabilities, Capability, CapabilityKind, EnergyRange, EvaluationError,
    KinePoint, PhaseSpace, XSecIntegrator, XSecModel,
};
pub use error::{RegistryError, RegistryResult};
pub use key::{AlgorithmKey, InvalidAlgorithmKey, DEFAULT_CONFIG};
pub use registry::{AlgorithmContext, AlgorithmFactory, AlgorithmRegistry};
