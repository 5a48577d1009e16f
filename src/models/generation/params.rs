use serde::{Deserialize, Serialize};

use crate::core::{GenerationError, Result};

/// Decoding parameters for one generation call.
///
/// A value is built by the caller (directly, from a content template or by
/// a sweep), validated once by the generator, and then carried unchanged
/// into the [`GenerationResult`](crate::pipelines::GenerationResult) with
/// its seed resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodingParameters {
    pub prompt: String,
    pub temperature: f64,
    pub top_k: usize,
    pub top_p: f64,
    /// `None` asks the seed controller for a fresh seed.
    pub seed: Option<u64>,
    /// Budget of newly generated tokens; the prompt does not count.
    pub max_length: usize,
}

impl DecodingParameters {
    /// Parameters for `prompt` with the crate-wide defaults.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: crate::DEFAULT_TEMPERATURE,
            top_k: crate::DEFAULT_TOP_K,
            top_p: crate::DEFAULT_TOP_P,
            seed: None,
            max_length: crate::DEFAULT_MAX_LENGTH,
        }
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Reject out-of-range values. Nothing is clamped.
    pub fn validate(&self, max_length_ceiling: usize) -> Result<()> {
        if !(self.temperature.is_finite() && self.temperature > 0.0) {
            return Err(GenerationError::invalid(
                "temperature",
                format!("must be a finite value > 0, got {}", self.temperature),
            ));
        }
        if self.top_k < 1 {
            return Err(GenerationError::invalid(
                "top_k",
                format!("must be >= 1, got {}", self.top_k),
            ));
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(GenerationError::invalid(
                "top_p",
                format!("must be in (0, 1], got {}", self.top_p),
            ));
        }
        if self.max_length < 1 || self.max_length > max_length_ceiling {
            return Err(GenerationError::invalid(
                "max_length",
                format!(
                    "must be in [1, {max_length_ceiling}], got {}",
                    self.max_length
                ),
            ));
        }
        if self.prompt.trim().is_empty() {
            return Err(GenerationError::invalid(
                "prompt",
                "must not be empty or whitespace",
            ));
        }
        Ok(())
    }

    /// Overwrite every field the overrides set, leaving the rest untouched.
    pub fn apply(&mut self, overrides: &ParameterOverrides) {
        if let Some(prompt) = &overrides.prompt {
            self.prompt.clone_from(prompt);
        }
        if let Some(temperature) = overrides.temperature {
            self.temperature = temperature;
        }
        if let Some(top_k) = overrides.top_k {
            self.top_k = top_k;
        }
        if let Some(top_p) = overrides.top_p {
            self.top_p = top_p;
        }
        if let Some(seed) = overrides.seed {
            self.seed = Some(seed);
        }
        if let Some(max_length) = overrides.max_length {
            self.max_length = max_length;
        }
    }
}

/// Field-by-field overrides layered on top of template defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterOverrides {
    pub prompt: Option<String>,
    pub temperature: Option<f64>,
    pub top_k: Option<usize>,
    pub top_p: Option<f64>,
    pub seed: Option<u64>,
    pub max_length: Option<usize>,
}

impl ParameterOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }
}
