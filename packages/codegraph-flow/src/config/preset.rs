//! Preset configurations
//!
//! Presets provide complete default solver configurations for common use cases.

use super::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Small programs / CI: no SCC optimizer, no index sharing
    ///
    /// - SCC interval: disabled
    /// - Index strategy: memory-intensive
    /// - Call strings: k=1
    Fast,

    /// Development: balanced defaults
    ///
    /// - SCC interval: 10_000 work items
    /// - Index strategy: processor-intensive
    /// - Call strings: k=2
    Balanced,

    /// Whole-program audits: frequent cycle collapsing, deeper contexts
    ///
    /// - SCC interval: 1_000 work items
    /// - Index strategy: processor-intensive
    /// - Bag order: FIFO
    /// - Call strings: k=3
    Thorough,

    /// Custom: User-defined (YAML only)
    ///
    /// Starts from the balanced defaults.
    Custom,
}

impl Preset {
    /// Parse preset from string
    pub fn parse(s: &str) -> ConfigResult<Self> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "thorough" => Ok(Self::Thorough),
            "custom" => Ok(Self::Custom),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Thorough => "thorough",
            Self::Custom => "custom",
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::Balanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for preset in [Preset::Fast, Preset::Balanced, Preset::Thorough, Preset::Custom] {
            assert_eq!(Preset::parse(preset.as_str()).unwrap(), preset);
        }
        assert_eq!(Preset::parse("THOROUGH").unwrap(), Preset::Thorough);
    }

    #[test]
    fn test_unknown_preset() {
        assert!(matches!(
            Preset::parse("turbo"),
            Err(ConfigError::UnknownPreset(name)) if name == "turbo"
        ));
    }
}
