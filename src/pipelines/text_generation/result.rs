use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::generation::DecodingParameters;
use crate::pipelines::templates::ContentType;

/// Why the sampling loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model emitted its end-of-sequence token.
    Eos,
    /// The token budget ran out.
    MaxLength,
}

/// One finished completion and everything needed to replay it.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    output_text: String,
    params: DecodingParameters,
    seed: u64,
    content_type: ContentType,
    timestamp: DateTime<Utc>,
    stop_reason: StopReason,
    tokens_generated: usize,
}

impl GenerationResult {
    pub(crate) fn new(
        output_text: String,
        mut params: DecodingParameters,
        seed: u64,
        content_type: ContentType,
        stop_reason: StopReason,
        tokens_generated: usize,
    ) -> Self {
        params.seed = Some(seed);
        Self {
            output_text,
            params,
            seed,
            content_type,
            timestamp: Utc::now(),
            stop_reason,
            tokens_generated,
        }
    }

    pub fn output_text(&self) -> &str {
        &self.output_text
    }

    /// Parameters as used, with the seed filled in.
    pub fn params(&self) -> &DecodingParameters {
        &self.params
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn stop_reason(&self) -> StopReason {
        self.stop_reason
    }

    pub fn tokens_generated(&self) -> usize {
        self.tokens_generated
    }

    pub fn to_record(&self) -> GenerationRecord {
        GenerationRecord::from(self)
    }
}

/// Flat persisted form of a [`GenerationResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub content_type: ContentType,
    pub prompt: String,
    pub temperature: f64,
    pub top_k: usize,
    pub top_p: f64,
    pub seed: u64,
    pub max_length: usize,
    pub output_text: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&GenerationResult> for GenerationRecord {
    fn from(result: &GenerationResult) -> Self {
        Self {
            content_type: result.content_type,
            prompt: result.params.prompt.clone(),
            temperature: result.params.temperature,
            top_k: result.params.top_k,
            top_p: result.params.top_p,
            seed: result.seed,
            max_length: result.params.max_length,
            output_text: result.output_text.clone(),
            timestamp: result.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_has_flat_fields() -> anyhow::Result<()> {
        let params = DecodingParameters::new("Ancient legend tells of ").temperature(0.9);
        let result = GenerationResult::new(
            "the lost crown.".into(),
            params,
            42,
            ContentType::Lore,
            StopReason::Eos,
            4,
        );
        assert_eq!(result.params().seed, Some(42));

        let value = serde_json::to_value(result.to_record())?;
        let object = value
            .as_object()
            .ok_or_else(|| anyhow::anyhow!("record is not an object"))?;
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            [
                "content_type",
                "max_length",
                "output_text",
                "prompt",
                "seed",
                "temperature",
                "timestamp",
                "top_k",
                "top_p"
            ]
        );
        assert_eq!(object["content_type"], "lore");
        assert_eq!(object["seed"], 42);
        Ok(())
    }
}
