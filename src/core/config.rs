use serde::{Deserialize, Serialize};

use super::error::{GenerationError, Result};

/// Generator-wide defaults and limits.
///
/// Defaults fill any decoding field a caller or content template leaves
/// unset. `max_length_ceiling` bounds every request's token budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub default_temperature: f64,
    pub default_top_k: usize,
    pub default_top_p: f64,
    pub default_max_length: usize,
    pub max_length_ceiling: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            default_temperature: crate::DEFAULT_TEMPERATURE,
            default_top_k: crate::DEFAULT_TOP_K,
            default_top_p: crate::DEFAULT_TOP_P,
            default_max_length: crate::DEFAULT_MAX_LENGTH,
            max_length_ceiling: crate::DEFAULT_MAX_LENGTH_CEILING,
        }
    }
}

impl GeneratorConfig {
    /// Parse a config from JSON. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the defaults themselves would pass request validation.
    pub fn validate(&self) -> Result<()> {
        if self.max_length_ceiling == 0 {
            return Err(GenerationError::invalid(
                "max_length_ceiling",
                "must be >= 1",
            ));
        }
        if !(self.default_temperature.is_finite() && self.default_temperature > 0.0) {
            return Err(GenerationError::invalid(
                "default_temperature",
                format!("must be a finite value > 0, got {}", self.default_temperature),
            ));
        }
        if self.default_top_k == 0 {
            return Err(GenerationError::invalid("default_top_k", "must be >= 1"));
        }
        if !(self.default_top_p > 0.0 && self.default_top_p <= 1.0) {
            return Err(GenerationError::invalid(
                "default_top_p",
                format!("must be in (0, 1], got {}", self.default_top_p),
            ));
        }
        if self.default_max_length == 0 || self.default_max_length > self.max_length_ceiling {
            return Err(GenerationError::invalid(
                "default_max_length",
                format!(
                    "must be in [1, {}], got {}",
                    self.max_length_ceiling, self.default_max_length
                ),
            ));
        }
        Ok(())
    }
}
