//! Target materials supplied by a detector description.
//!
//! The driver only needs the set of target codes present; how a geometry
//! is described is up to the adapter.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::driver::error::{GeometryError, GeometryResult};
use crate::interaction::{Pdg, Target};

pub trait GeometrySource: Send + Sync {
    /// Every distinct target code in the geometry.
    fn list_target_materials(&self) -> GeometryResult<BTreeSet<Pdg>>;
}

/// A fixed set of targets.
#[derive(Debug, Clone, Default)]
pub struct StaticGeometry {
    targets: BTreeSet<Pdg>,
}

impl StaticGeometry {
    pub fn new(targets: impl IntoIterator<Item = Pdg>) -> Self {
        Self {
            targets: targets.into_iter().collect(),
        }
    }
}

impl GeometrySource for StaticGeometry {
    fn list_target_materials(&self) -> GeometryResult<BTreeSet<Pdg>> {
        Ok(self.targets.clone())
    }
}

#[derive(Debug, Deserialize)]
struct MaterialTable {
    #[serde(default)]
    volumes: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    name: String,
    #[serde(default)]
    targets: Vec<Pdg>,
}

/// A TOML list of detector volumes and the targets each one contains.
///
/// ```toml
/// [[volumes]]
/// name = "calorimeter"
/// targets = [1000260560, 1000060120]
/// ```
#[derive(Debug, Clone)]
pub struct MaterialFile {
    path: PathBuf,
}

impl MaterialFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GeometrySource for MaterialFile {
    fn list_target_materials(&self) -> GeometryResult<BTreeSet<Pdg>> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| GeometryError::Io {
            path: self.path.clone(),
            source,
        })?;
        let table: MaterialTable = toml::from_str(&text).map_err(|source| GeometryError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let mut targets = BTreeSet::new();
        for volume in &table.volumes {
            for &code in &volume.targets {
                if Target::from_pdg(code).is_none() {
                    return Err(GeometryError::InvalidTarget {
                        volume: volume.name.clone(),
                        code,
                    });
                }
                targets.insert(code);
            }
        }

        tracing::debug!(
            path = %self.path.display(),
            volumes = table.volumes.len(),
            targets = targets.len(),
            "Geometry materials listed"
        );
        Ok(targets)
    }
}
