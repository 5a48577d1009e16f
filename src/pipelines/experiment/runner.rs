use tracing::{info, warn};

use crate::core::{GenerationControl, HistoryEntry, Result};
use crate::models::generation::DecodingParameters;
use crate::pipelines::templates::ContentType;
use crate::pipelines::text_generation::{GenerationResult, TextGenerator};

use super::report::{ExperimentReport, ExperimentRun};
use super::sweep::{self, Sweep, VariedParameter};

/// Runs every combination of a [`Sweep`] against one generator.
///
/// A failing combination is reported in place and never aborts the sweep.
/// Successful runs are appended to the generator's history in enumeration
/// order.
pub struct ExperimentRunner<'a> {
    generator: &'a TextGenerator,
    name: String,
    content_type: ContentType,
    control: GenerationControl,
    verify_reproducibility: bool,
    record_history: bool,
}

impl<'a> ExperimentRunner<'a> {
    pub fn new(generator: &'a TextGenerator) -> Self {
        Self {
            generator,
            name: "sweep".to_string(),
            content_type: ContentType::Custom,
            control: GenerationControl::default(),
            verify_reproducibility: false,
            record_history: true,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Content type recorded on every run.
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_control(mut self, control: GenerationControl) -> Self {
        self.control = control;
        self
    }

    /// Replay each successful run under its resolved seed and flag whether
    /// the text came back identical. A replay that errors counts as not
    /// reproduced; the first result is kept.
    pub fn verify_reproducibility(mut self, verify: bool) -> Self {
        self.verify_reproducibility = verify;
        self
    }

    pub fn record_history(mut self, record: bool) -> Self {
        self.record_history = record;
        self
    }

    pub fn run(&self, base: &DecodingParameters, sweep: &Sweep) -> ExperimentReport {
        let combinations = sweep.combinations();
        let _span = tracing::info_span!(
            "run_sweep",
            name = %self.name,
            combinations = combinations.len()
        )
        .entered();

        let mut runs = Vec::with_capacity(combinations.len());
        for (index, varied) in combinations.into_iter().enumerate() {
            match self.run_one(base, &varied) {
                Ok((result, reproducible)) => {
                    if self.record_history {
                        self.generator
                            .history_log()
                            .append(HistoryEntry::Generation(result.clone()));
                    }
                    runs.push(ExperimentRun::success(varied, result, reproducible));
                }
                Err(err) => {
                    warn!(index, kind = %err.kind(), error = %err, "sweep run failed");
                    runs.push(ExperimentRun::failed(varied, &err));
                }
            }
        }

        let report = ExperimentReport::new(self.name.clone(), runs);
        info!(
            runs = report.len(),
            failed = report.failures().count(),
            "sweep finished"
        );
        report
    }

    fn run_one(
        &self,
        base: &DecodingParameters,
        varied: &[VariedParameter],
    ) -> Result<(GenerationResult, Option<bool>)> {
        let mut params = base.clone();
        for setting in varied {
            sweep::apply(setting, &mut params)?;
        }
        let result = self
            .generator
            .complete(params, self.content_type, &self.control)?;

        let reproducible = if self.verify_reproducibility {
            match self.generator.complete(
                result.params().clone(),
                self.content_type,
                &self.control,
            ) {
                Ok(replay) => Some(replay.output_text() == result.output_text()),
                Err(err) => {
                    warn!(seed = result.seed(), error = %err, "replay failed");
                    Some(false)
                }
            }
        } else {
            None
        };
        Ok((result, reproducible))
    }
}
