//! Cheap text heuristics used to annotate experiment runs.
//!
//! None of these look at the model. They score the sampled text and the
//! temperature it was drawn at so sweeps can be compared side by side.

use serde::{Deserialize, Serialize};

use crate::pipelines::text_generation::GenerationResult;

/// Rough flavour of a generated snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variation {
    TaskLike,
    FantasyThemed,
    Generic,
}

impl Variation {
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("quest") || lower.contains("must") {
            Self::TaskLike
        } else if lower.contains("dragon") || lower.contains("magic") {
            Self::FantasyThemed
        } else {
            Self::Generic
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TaskLike => "task-like",
            Self::FantasyThemed => "fantasy-themed",
            Self::Generic => "generic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Expected output quality for the sampling temperature, out of 10.
    pub quality: u8,
    pub quality_note: String,
    pub variation: Variation,
    pub coherence: u8,
    pub usability: u8,
    pub word_count: usize,
}

impl Assessment {
    pub fn of(result: &GenerationResult) -> Self {
        let text = result.output_text();
        let words = text.split_whitespace().count();
        let (quality, note) = temperature_quality(result.params().temperature);
        Self {
            quality,
            quality_note: note.to_string(),
            variation: Variation::classify(text),
            coherence: coherence(words),
            usability: usability(text, words),
            word_count: words,
        }
    }
}

/// Quality score and note for a sampling temperature.
pub fn temperature_quality(temperature: f64) -> (u8, &'static str) {
    if temperature <= 0.5 {
        (8, "Conservative, good structure")
    } else if temperature <= 0.8 {
        (9, "Balanced, excellent for games")
    } else if temperature <= 1.0 {
        (7, "Creative but may repeat")
    } else {
        (4, "Very random, less usable")
    }
}

/// Very short and very long outputs read worst.
pub fn coherence(words: usize) -> u8 {
    match words {
        0..=4 => 3,
        5..=14 => 8,
        15..=29 => 7,
        _ => 5,
    }
}

pub fn usability(text: &str, words: usize) -> u8 {
    let capitalized = text.chars().next().is_some_and(char::is_uppercase);
    if words > 5 && words < 25 && capitalized {
        9
    } else if words > 30 {
        5
    } else {
        7
    }
}
