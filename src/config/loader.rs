//! Configuration loading from disk.
//!
//! The built-in `config/defaults.toml` is the bottom layer. Each file passed
//! in is merged on top of it table by table, so a layer only needs to name
//! the keys it changes.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::schema::AppConfig;
use crate::config::validation::validate_config;

/// Built-in defaults, compiled into the binary.
pub const DEFAULTS: &str = include_str!("../../config/defaults.toml");

/// Load and validate configuration from a single TOML file on top of the
/// built-in defaults.
pub fn load_config(path: &Path) -> ConfigResult<AppConfig> {
    load_layers(&[path.to_path_buf()])
}

/// Merge the built-in defaults with every layer in order, then validate.
pub fn load_layers(paths: &[PathBuf]) -> ConfigResult<AppConfig> {
    let mut merged: toml::Table = toml::from_str(DEFAULTS)?;

    for path in paths {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let layer: toml::Table = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), keys = layer.len(), "Merging config layer");
        merge_tables(&mut merged, layer);
    }

    parse_merged(merged)
}

/// Parse configuration text (one layer) on top of the built-in defaults.
pub fn load_str(content: &str) -> ConfigResult<AppConfig> {
    let mut merged: toml::Table = toml::from_str(DEFAULTS)?;
    let layer: toml::Table = toml::from_str(content)?;
    merge_tables(&mut merged, layer);
    parse_merged(merged)
}

fn parse_merged(merged: toml::Table) -> ConfigResult<AppConfig> {
    let config: AppConfig = toml::Value::Table(merged).try_into()?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Recursive table merge; non-table values from `layer` replace those in `base`.
fn merge_tables(base: &mut toml::Table, layer: toml::Table) {
    for (key, value) in layer {
        match value {
            toml::Value::Table(incoming) => {
                if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                    merge_tables(existing, incoming);
                    continue;
                }
                base.insert(key, toml::Value::Table(incoming));
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}
