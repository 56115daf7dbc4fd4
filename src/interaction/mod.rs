//! Interaction identities: particle codes, initial states and process keys.

pub mod pdg;
pub mod process;

pub use pdg::{InitialState, Pdg, Target};
pub use process::{reachable_processes, Current, ProcessClass, ProcessKey, ScatteringType};
