//! Solver configuration
//!
//! Tunables of the propagation core: optimizer interval, index
//! canonicalization strategy, work-bag discipline and call-string depth.

use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use serde::{Deserialize, Serialize};

/// Supported YAML schema versions
pub const SUPPORTED_VERSIONS: &[u32] = &[1];

/// Upper bound for the SCC optimizer interval
const MAX_SCC_INTERVAL: i64 = 100_000_000;

/// Upper bound for k in k-limited call strings
const MAX_CALL_STRING_DEPTH: usize = 32;

/// Index canonicalization strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStrategy {
    /// Every raw index survives as-is (no lookup cost, more memory)
    MemoryIntensive,

    /// Equal indices are shared through a set of first-seen indices
    ProcessorIntensive,
}

impl Default for IndexStrategy {
    fn default() -> Self {
        IndexStrategy::ProcessorIntensive
    }
}

/// Pop discipline of a work bag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BagOrder {
    /// Stack discipline
    Lifo,

    /// Queue discipline
    Fifo,
}

impl Default for BagOrder {
    fn default() -> Self {
        BagOrder::Lifo
    }
}

/// Propagation solver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Completed work items between SCC optimizer passes (<= 0 disables)
    pub scc_interval: i64,

    /// Index canonicalization strategy
    pub index_strategy: IndexStrategy,

    /// Work bag discipline
    pub bag_order: BagOrder,

    /// k for k-limited call strings (0 = unbounded)
    pub call_string_depth: usize,
}

impl SolverConfig {
    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.scc_interval > MAX_SCC_INTERVAL {
            return Err(ConfigError::range_with_hint(
                "scc_interval",
                self.scc_interval,
                i64::MIN,
                MAX_SCC_INTERVAL,
                "Use a non-positive value to disable the optimizer",
            ));
        }

        if self.call_string_depth > MAX_CALL_STRING_DEPTH {
            return Err(ConfigError::range_with_hint(
                "call_string_depth",
                self.call_string_depth,
                0,
                MAX_CALL_STRING_DEPTH,
                "Deep call strings explode the number of variants",
            ));
        }

        Ok(())
    }

    /// Whether the SCC optimizer runs at all
    #[inline]
    pub fn optimizer_enabled(&self) -> bool {
        self.scc_interval > 0
    }

    /// Builder: Set scc_interval
    pub fn scc_interval(mut self, v: i64) -> Self {
        self.scc_interval = v;
        self
    }

    /// Builder: Set index_strategy
    pub fn index_strategy(mut self, v: IndexStrategy) -> Self {
        self.index_strategy = v;
        self
    }

    /// Builder: Set bag_order
    pub fn bag_order(mut self, v: BagOrder) -> Self {
        self.bag_order = v;
        self
    }

    /// Builder: Set call_string_depth
    pub fn call_string_depth(mut self, v: usize) -> Self {
        self.call_string_depth = v;
        self
    }

    /// Get preset configuration
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Fast => Self {
                scc_interval: 0,
                index_strategy: IndexStrategy::MemoryIntensive,
                bag_order: BagOrder::Lifo,
                call_string_depth: 1,
            },
            Preset::Balanced | Preset::Custom => Self {
                scc_interval: 10_000,
                index_strategy: IndexStrategy::ProcessorIntensive,
                bag_order: BagOrder::Lifo,
                call_string_depth: 2,
            },
            Preset::Thorough => Self {
                scc_interval: 1_000,
                index_strategy: IndexStrategy::ProcessorIntensive,
                bag_order: BagOrder::Fifo,
                call_string_depth: 3,
            },
        }
    }

    /// Load a configuration from YAML (schema v1)
    ///
    /// ```yaml
    /// version: 1
    /// preset: thorough
    /// solver:
    ///   scc_interval: 500
    ///   index_strategy: memory_intensive
    /// ```
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let file: SolverConfigFile = serde_yaml::from_str(yaml)?;

        let version = file.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let preset = match file.preset.as_deref() {
            Some(name) => Preset::parse(name)?,
            None => Preset::default(),
        };

        let mut config = Self::from_preset(preset);
        if let Some(patch) = file.solver {
            patch.apply(&mut config);
        }
        config.validate()?;
        Ok(config)
    }

    /// Export as YAML (schema v1, custom preset with every field overridden)
    pub fn to_yaml_string(&self) -> ConfigResult<String> {
        let file = SolverConfigFile {
            version: Some(1),
            preset: Some(Preset::Custom.as_str().to_string()),
            solver: Some(SolverConfigPatch::from(self)),
        };
        Ok(serde_yaml::to_string(&file)?)
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

/// YAML schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SolverConfigFile {
    /// Schema version (always 1 for v1)
    version: Option<u32>,

    /// Base preset
    #[serde(skip_serializing_if = "Option::is_none")]
    preset: Option<String>,

    /// Fine-grained overrides
    #[serde(skip_serializing_if = "Option::is_none")]
    solver: Option<SolverConfigPatch>,
}

/// Partial override of a preset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scc_interval: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_strategy: Option<IndexStrategy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bag_order: Option<BagOrder>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_string_depth: Option<usize>,
}

impl SolverConfigPatch {
    /// Apply every present field onto `config`
    pub fn apply(&self, config: &mut SolverConfig) {
        if let Some(v) = self.scc_interval {
            config.scc_interval = v;
        }
        if let Some(v) = self.index_strategy {
            config.index_strategy = v;
        }
        if let Some(v) = self.bag_order {
            config.bag_order = v;
        }
        if let Some(v) = self.call_string_depth {
            config.call_string_depth = v;
        }
    }
}

impl From<&SolverConfig> for SolverConfigPatch {
    fn from(config: &SolverConfig) -> Self {
        Self {
            scc_interval: Some(config.scc_interval),
            index_strategy: Some(config.index_strategy),
            bag_order: Some(config.bag_order),
            call_string_depth: Some(config.call_string_depth),
        }
    }
}
