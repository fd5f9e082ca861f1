//! Solver configuration system
//!
//! Two tiers, mirroring the rest of the codegraph configuration story:
//! - Level 1: Preset (`SolverConfig::from_preset`)
//! - Level 2: YAML with per-field overrides (`SolverConfig::from_yaml_str`)
//!
//! # Examples
//!
//! ```rust,ignore
//! use codegraph_flow::config::{Preset, SolverConfig};
//!
//! let config = SolverConfig::from_preset(Preset::Thorough).scc_interval(500);
//! config.validate()?;
//! ```

pub mod error;
pub mod preset;
pub mod solver_config;

pub use error::{ConfigError, ConfigResult};
pub use preset::Preset;
pub use solver_config::{BagOrder, IndexStrategy, SolverConfig, SolverConfigPatch};
