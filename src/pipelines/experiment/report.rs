use comfy_table::{ContentArrangement, Table};
use serde::{Deserialize, Serialize};

use crate::core::{ErrorKind, GenerationError};
use crate::pipelines::text_generation::{GenerationRecord, GenerationResult};

use super::assess::Assessment;
use super::sweep::VariedParameter;

const TABLE_TEXT_WIDTH: usize = 60;

/// How a single sweep combination ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Success(GenerationResult),
    Failed { kind: ErrorKind, message: String },
}

/// One combination of a sweep and its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentRun {
    pub varied: Vec<VariedParameter>,
    pub outcome: RunOutcome,
    /// Whether replaying the run's seed reproduced its text. `None` when the
    /// runner was not asked to check, or the run failed.
    pub reproducible: Option<bool>,
    pub assessment: Option<Assessment>,
}

impl ExperimentRun {
    pub(crate) fn success(
        varied: Vec<VariedParameter>,
        result: GenerationResult,
        reproducible: Option<bool>,
    ) -> Self {
        let assessment = Some(Assessment::of(&result));
        Self {
            varied,
            outcome: RunOutcome::Success(result),
            reproducible,
            assessment,
        }
    }

    pub(crate) fn failed(varied: Vec<VariedParameter>, err: &GenerationError) -> Self {
        Self {
            varied,
            outcome: RunOutcome::Failed {
                kind: err.kind(),
                message: err.to_string(),
            },
            reproducible: None,
            assessment: None,
        }
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        match &self.outcome {
            RunOutcome::Success(result) => Some(result),
            RunOutcome::Failed { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match &self.outcome {
            RunOutcome::Success(_) => None,
            RunOutcome::Failed { kind, .. } => Some(*kind),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result().is_some()
    }

    pub fn to_record(&self) -> ExperimentRecord {
        let (status, error_kind, error_message, generation) = match &self.outcome {
            RunOutcome::Success(result) => ("ok", None, None, Some(result.to_record())),
            RunOutcome::Failed { kind, message } => {
                ("failed", Some(*kind), Some(message.clone()), None)
            }
        };
        ExperimentRecord {
            varied: self.varied.clone(),
            status: status.to_string(),
            error_kind,
            error_message,
            reproducible: self.reproducible,
            assessment: self.assessment.clone(),
            generation,
        }
    }
}

/// Persisted form of one [`ExperimentRun`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    pub varied: Vec<VariedParameter>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reproducible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub assessment: Option<Assessment>,
    #[serde(flatten)]
    pub generation: Option<GenerationRecord>,
}

/// Every run of one sweep, in enumeration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentReport {
    pub name: String,
    runs: Vec<ExperimentRun>,
}

impl ExperimentReport {
    pub(crate) fn new(name: impl Into<String>, runs: Vec<ExperimentRun>) -> Self {
        Self {
            name: name.into(),
            runs,
        }
    }

    pub fn runs(&self) -> &[ExperimentRun] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn successes(&self) -> impl Iterator<Item = &GenerationResult> {
        self.runs.iter().filter_map(ExperimentRun::result)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ExperimentRun> {
        self.runs.iter().filter(|run| !run.is_success())
    }

    pub fn to_records(&self) -> Vec<ExperimentRecord> {
        self.runs.iter().map(ExperimentRun::to_record).collect()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&serde_json::json!({
            "experiment": self.name,
            "runs": self.to_records(),
        }))
    }

    /// Render the report as a terminal table, one row per run.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);

        let mut header = vec!["#".to_string()];
        if let Some(first) = self.runs.first() {
            header.extend(first.varied.iter().map(|v| v.name.to_string()));
        }
        header.extend(
            ["status", "seed", "output", "quality", "coherence", "usability", "repro"]
                .map(String::from),
        );
        table.set_header(header);

        for (index, run) in self.runs.iter().enumerate() {
            let mut row = vec![(index + 1).to_string()];
            row.extend(run.varied.iter().map(|v| v.value.to_string()));
            match &run.outcome {
                RunOutcome::Success(result) => {
                    row.push("ok".into());
                    row.push(result.seed().to_string());
                    row.push(clip(result.output_text(), TABLE_TEXT_WIDTH));
                }
                RunOutcome::Failed { kind, message } => {
                    row.push(kind.to_string());
                    row.push("-".into());
                    row.push(clip(message, TABLE_TEXT_WIDTH));
                }
            }
            match &run.assessment {
                Some(a) => {
                    row.push(format!("{}/10", a.quality));
                    row.push(format!("{}/10", a.coherence));
                    row.push(format!("{}/10", a.usability));
                }
                None => row.extend(["-", "-", "-"].map(String::from)),
            }
            row.push(match run.reproducible {
                Some(true) => "yes".into(),
                Some(false) => "NO".into(),
                None => "-".into(),
            });
            table.add_row(row);
        }
        table
    }
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut clipped: String = text.chars().take(width.saturating_sub(3)).collect();
        clipped.push_str("...");
        clipped
    }
}
