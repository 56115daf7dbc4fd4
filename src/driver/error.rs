//! Driver errors and their process exit codes.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::algorithm::RegistryError;
use crate::interaction::Pdg;
use crate::spline::SplineError;

/// Which input list came up empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSet {
    Probes,
    Targets,
}

impl fmt::Display for InputSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSet::Probes => write!(f, "probe"),
            InputSet::Targets => write!(f, "target"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Failed to read geometry file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse geometry file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Volume '{volume}' lists invalid target code {code}")]
    InvalidTarget { volume: String, code: Pdg },
}

pub type GeometryResult<T> = Result<T, GeometryError>;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Empty {0} set: nothing to build")]
    EmptyInputSet(InputSet),

    #[error("Both target codes and a geometry source were given; use one")]
    ConflictingTargetSources,

    #[error("No target codes and no geometry source were given")]
    NoTargetSource,

    #[error("Invalid {kind} code {code}")]
    InvalidCode { kind: InputSet, code: Pdg },

    #[error("Generator {0} does not provide a cross-section model")]
    NotAModel(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Spline(#[from] SplineError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("Knot count {requested} exceeds the maximum of {max}")]
    InvalidKnotCount { requested: usize, max: usize },
}

impl DriverError {
    /// Exit status for a run that stops on this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            DriverError::EmptyInputSet(InputSet::Probes) => 2,
            DriverError::EmptyInputSet(InputSet::Targets) => 3,
            _ => 1,
        }
    }
}

pub type DriverResult<T> = Result<T, DriverError>;
