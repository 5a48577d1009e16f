use std::sync::Arc;

use crate::core::{global_history, GeneratorConfig, HistoryLog, Result};
use crate::models::{LanguageModel, TextTokenizer};

use super::pipeline::TextGenerator;

/// Builder for configuring and constructing a [`TextGenerator`].
///
/// Unset values fall back to [`GeneratorConfig::default`]. Without an
/// explicit history log the generator records into the process-wide
/// [`global_history`].
///
/// ```rust
/// use loreweaver::models::ToyModel;
/// use loreweaver::pipelines::TextGeneratorBuilder;
///
/// let (model, tokenizer) = ToyModel::fantasy();
/// let generator = TextGeneratorBuilder::new(model, tokenizer)
///     .temperature(0.8)
///     .max_length_ceiling(256)
///     .build()?;
/// # Ok::<(), loreweaver::GenerationError>(())
/// ```
pub struct TextGeneratorBuilder {
    model: Arc<dyn LanguageModel>,
    tokenizer: Arc<dyn TextTokenizer>,
    config: GeneratorConfig,
    temperature: Option<f64>,
    top_k: Option<usize>,
    top_p: Option<f64>,
    max_len: Option<usize>,
    max_length_ceiling: Option<usize>,
    history: Option<Arc<HistoryLog>>,
}

impl TextGeneratorBuilder {
    pub fn new(
        model: impl LanguageModel + 'static,
        tokenizer: impl TextTokenizer + 'static,
    ) -> Self {
        Self::from_shared(Arc::new(model), Arc::new(tokenizer))
    }

    /// Start from a model and tokenizer that are already shared elsewhere.
    pub fn from_shared(model: Arc<dyn LanguageModel>, tokenizer: Arc<dyn TextTokenizer>) -> Self {
        Self {
            model,
            tokenizer,
            config: GeneratorConfig::default(),
            temperature: None,
            top_k: None,
            top_p: None,
            max_len: None,
            max_length_ceiling: None,
            history: None,
        }
    }

    /// Replace the whole base config. Individual setters still win.
    pub fn config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default sampling temperature (default: 0.7).
    ///
    /// Higher values make output more random, lower values more deterministic.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the default top-k cutoff (default: 50).
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Set the default nucleus cutoff (default: 0.95).
    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Set the default token budget for custom prompts (default: 50).
    pub fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    /// Set the upper bound any request's token budget may ask for (default: 512).
    pub fn max_length_ceiling(mut self, ceiling: usize) -> Self {
        self.max_length_ceiling = Some(ceiling);
        self
    }

    /// Record into `history` instead of the process-wide log.
    pub fn history(mut self, history: Arc<HistoryLog>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn build(self) -> Result<TextGenerator> {
        let mut config = self.config;
        if let Some(temperature) = self.temperature {
            config.default_temperature = temperature;
        }
        if let Some(top_k) = self.top_k {
            config.default_top_k = top_k;
        }
        if let Some(top_p) = self.top_p {
            config.default_top_p = top_p;
        }
        if let Some(max_len) = self.max_len {
            config.default_max_length = max_len;
        }
        if let Some(ceiling) = self.max_length_ceiling {
            config.max_length_ceiling = ceiling;
        }
        config.validate()?;

        let history = self.history.unwrap_or_else(global_history);
        tracing::debug!(model = self.model.name(), ?config, "built text generator");
        Ok(TextGenerator::new(self.model, self.tokenizer, config, history))
    }
}
