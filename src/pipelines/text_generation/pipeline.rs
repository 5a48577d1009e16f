use std::sync::Arc;
use std::time::Instant;

use crate::core::{
    GenerationControl, GenerationError, GeneratorConfig, HistoryEntry, HistoryLog, Result,
};
use crate::models::generation::{
    DecodingParameters, LogitsProcessor, ParameterOverrides, SeedController,
};
use crate::models::{LanguageModel, TextTokenizer};
use crate::pipelines::experiment::{ExperimentReport, ExperimentRunner, Sweep};
use crate::pipelines::story::{StoryComposer, StoryResult};
use crate::pipelines::templates::{self, ContentType};

use super::builder::TextGeneratorBuilder;
use super::result::{GenerationResult, StopReason};
use super::truncate::truncate_to_sentence;

/// Drives a language model to produce game text under explicit decoding
/// parameters.
///
/// A generator is cheap to share between threads: the model and tokenizer
/// are read-only, every call owns its own random source, and the history
/// log serializes appends.
pub struct TextGenerator {
    model: Arc<dyn LanguageModel>,
    tokenizer: Arc<dyn TextTokenizer>,
    config: GeneratorConfig,
    history: Arc<HistoryLog>,
}

impl TextGenerator {
    pub(crate) fn new(
        model: Arc<dyn LanguageModel>,
        tokenizer: Arc<dyn TextTokenizer>,
        config: GeneratorConfig,
        history: Arc<HistoryLog>,
    ) -> Self {
        Self {
            model,
            tokenizer,
            config,
            history,
        }
    }

    pub fn builder(
        model: impl LanguageModel + 'static,
        tokenizer: impl TextTokenizer + 'static,
    ) -> TextGeneratorBuilder {
        TextGeneratorBuilder::new(model, tokenizer)
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn history_log(&self) -> &Arc<HistoryLog> {
        &self.history
    }

    /// Every recorded generation and story, oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.all()
    }

    /// Parameters for `content_type` after merging template defaults with
    /// `overrides`.
    pub fn params_for(
        &self,
        content_type: ContentType,
        overrides: &ParameterOverrides,
    ) -> DecodingParameters {
        templates::build(content_type, overrides, &self.config)
    }

    /// Generate one piece of templated content and record it.
    pub fn generate(
        &self,
        content_type: ContentType,
        overrides: &ParameterOverrides,
    ) -> Result<GenerationResult> {
        self.generate_with(content_type, overrides, &GenerationControl::default())
    }

    pub fn generate_with(
        &self,
        content_type: ContentType,
        overrides: &ParameterOverrides,
        control: &GenerationControl,
    ) -> Result<GenerationResult> {
        let params = self.params_for(content_type, overrides);
        let result = self.complete(params, content_type, control)?;
        self.history.append(HistoryEntry::Generation(result.clone()));
        Ok(result)
    }

    /// Generate from a raw prompt and record it as custom content.
    pub fn generate_prompt(&self, params: DecodingParameters) -> Result<GenerationResult> {
        let result = self.complete(params, ContentType::Custom, &GenerationControl::default())?;
        self.history.append(HistoryEntry::Generation(result.clone()));
        Ok(result)
    }

    /// Run one completion without touching the history log.
    ///
    /// Validation happens before any model call. Two calls with equal
    /// parameters (seed included) against an unchanged model produce the
    /// same text.
    pub fn complete(
        &self,
        params: DecodingParameters,
        content_type: ContentType,
        control: &GenerationControl,
    ) -> Result<GenerationResult> {
        params.validate(self.config.max_length_ceiling)?;

        let (seed, mut rng) = SeedController::resolve(params.seed);
        let _span = tracing::debug_span!("generate", %content_type, seed).entered();
        tracing::debug!(
            temperature = params.temperature,
            top_k = params.top_k,
            top_p = params.top_p,
            max_length = params.max_length,
            "starting generation"
        );

        let processor = LogitsProcessor::from_params(&params);
        let mut context = self
            .tokenizer
            .encode(&params.prompt)
            .map_err(GenerationError::ModelUnavailable)?;
        if context.is_empty() {
            return Err(GenerationError::ModelUnavailable(anyhow::anyhow!(
                "prompt {:?} encoded to zero tokens",
                params.prompt
            )));
        }
        let prompt_len = context.len();
        let eos_token = self.model.eos_token_id();
        let started = Instant::now();

        let mut stop_reason = StopReason::MaxLength;
        while context.len() - prompt_len < params.max_length {
            let produced = context.len() - prompt_len;
            if control.is_cancelled() {
                tracing::debug!(produced, "generation cancelled");
                return Err(GenerationError::Cancelled { produced });
            }
            if let Some(budget) = control.budget {
                let elapsed = started.elapsed();
                if elapsed >= budget {
                    return Err(GenerationError::Timeout { budget, elapsed });
                }
            }

            let logits = self
                .model
                .next_token_logits(&context)
                .map_err(GenerationError::ModelUnavailable)?;
            let token = processor
                .sample(&logits, &mut rng)
                .map_err(GenerationError::ModelUnavailable)?;
            tracing::trace!(step = produced, token, "sampled");

            if Some(token) == eos_token {
                stop_reason = StopReason::Eos;
                break;
            }
            context.push(token);
        }

        let generated = &context[prompt_len..];
        let decoded = self
            .tokenizer
            .decode(generated)
            .map_err(GenerationError::ModelUnavailable)?;
        let output_text = match stop_reason {
            StopReason::MaxLength => truncate_to_sentence(decoded.trim()),
            StopReason::Eos => decoded.trim(),
        }
        .trim()
        .to_string();

        tracing::debug!(
            tokens = generated.len(),
            ?stop_reason,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "finished generation"
        );

        Ok(GenerationResult::new(
            output_text,
            params,
            seed,
            content_type,
            stop_reason,
            generated.len(),
        ))
    }

    /// Compose a four-part story from one seed; see [`StoryComposer`].
    pub fn compose_story(&self, seed: Option<u64>, temperature: f64) -> Result<StoryResult> {
        StoryComposer::new(self).compose(seed, temperature)
    }

    /// Run a parameter sweep; see [`ExperimentRunner`].
    pub fn run_sweep(&self, base: &DecodingParameters, sweep: &Sweep) -> ExperimentReport {
        ExperimentRunner::new(self).run(base, sweep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CancellationToken, ErrorKind};
    use crate::models::ToyModel;
    use std::time::Duration;

    fn generator() -> TextGenerator {
        let (model, tokenizer) = ToyModel::fantasy();
        TextGenerator::builder(model, tokenizer)
            .history(Arc::new(HistoryLog::new()))
            .build()
            .unwrap()
    }

    #[test]
    fn same_seed_same_text() -> anyhow::Result<()> {
        let generator = generator();
        let params = DecodingParameters::new("the dragon").seed(42).max_length(30);
        let a = generator.complete(params.clone(), ContentType::Custom, &Default::default())?;
        let b = generator.complete(params, ContentType::Custom, &Default::default())?;
        assert_eq!(a.output_text(), b.output_text());
        assert_eq!(a.seed(), 42);
        Ok(())
    }

    #[test]
    fn missing_seed_is_resolved_and_replayable() -> anyhow::Result<()> {
        let generator = generator();
        let params = DecodingParameters::new("the dragon").max_length(25);
        let first = generator.complete(params.clone(), ContentType::Custom, &Default::default())?;
        assert_eq!(first.params().seed, Some(first.seed()));

        let replay = generator.complete(
            params.seed(first.seed()),
            ContentType::Custom,
            &Default::default(),
        )?;
        assert_eq!(first.output_text(), replay.output_text());
        Ok(())
    }

    #[test]
    fn budget_bounds_generated_tokens() -> anyhow::Result<()> {
        let generator = generator();
        for max_length in [1, 5, 17] {
            let params = DecodingParameters::new("the king")
                .seed(3)
                .max_length(max_length);
            let result = generator.complete(params, ContentType::Custom, &Default::default())?;
            assert!(result.tokens_generated() <= max_length);
        }
        Ok(())
    }

    #[test]
    fn complete_does_not_record() -> anyhow::Result<()> {
        let generator = generator();
        generator.complete(
            DecodingParameters::new("a sword").seed(1),
            ContentType::Custom,
            &Default::default(),
        )?;
        assert!(generator.history_log().is_empty());
        generator.generate_prompt(DecodingParameters::new("a sword").seed(1))?;
        assert_eq!(generator.history_log().len(), 1);
        Ok(())
    }

    #[test]
    fn invalid_parameters_fail_before_recording() {
        let generator = generator();
        let err = generator
            .generate(ContentType::Name, &ParameterOverrides::new().temperature(0.0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert_eq!(err.field(), Some("temperature"));
        assert!(generator.history_log().is_empty());
    }

    #[test]
    fn cancelled_call_records_nothing() {
        let generator = generator();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = generator
            .generate_with(
                ContentType::Quest,
                &ParameterOverrides::new().seed(1),
                &GenerationControl::with_cancel(cancel),
            )
            .unwrap_err();
        assert!(matches!(err, GenerationError::Cancelled { produced: 0 }));
        assert!(generator.history_log().is_empty());
    }

    #[test]
    fn zero_budget_times_out() {
        let generator = generator();
        let err = generator
            .generate_with(
                ContentType::Lore,
                &ParameterOverrides::new().seed(1),
                &GenerationControl::with_budget(Duration::ZERO),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[test]
    fn unknown_prompt_words_still_generate() -> anyhow::Result<()> {
        let generator = generator();
        let result = generator.generate_prompt(DecodingParameters::new("zzz").seed(8))?;
        assert!(result.tokens_generated() > 0);
        Ok(())
    }
}
