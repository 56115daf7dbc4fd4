//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config/defaults.toml (embedded)
//!     + -c layers (merged table by table, last layer wins)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!         ├─ splines / driver / observability → run settings
//!         └─ algorithms → store.rs ConfigStore, shared via Arc
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Algorithm parameters fall back from their own scope to `global`

pub mod error;
pub mod loader;
pub mod schema;
pub mod store;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_layers, load_str};
pub use schema::{AppConfig, DriverConfig, LoadPolicyKind, ObservabilityConfig, SplineSettings};
pub use store::{ConfigEntry, ConfigStore, ConfigValue, GLOBAL_SCOPE};
