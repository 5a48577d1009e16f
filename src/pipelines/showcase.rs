//! A fixed sampler of game assets across content types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::models::generation::ParameterOverrides;
use crate::pipelines::templates::ContentType;
use crate::pipelines::text_generation::TextGenerator;

const NAME_TEMPERATURES: [f64; 3] = [0.5, 0.7, 1.0];
const QUEST_SEEDS: [u64; 3] = [42, 123, 456];
const ITEM_SEEDS: std::ops::RangeInclusive<u64> = 100..=102;
const LORE_TEMPERATURES: [f64; 2] = [0.6, 0.8];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowcaseEntry {
    pub seed: u64,
    pub temperature: f64,
    pub text: String,
}

/// Sample assets of every templated type, ready to print or save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetShowcase {
    pub model: String,
    pub generated_at: DateTime<Utc>,
    pub character_names: Vec<ShowcaseEntry>,
    pub quests: Vec<ShowcaseEntry>,
    pub magic_items: Vec<ShowcaseEntry>,
    pub world_lore: Vec<ShowcaseEntry>,
}

impl AssetShowcase {
    pub fn sections(&self) -> [(&'static str, &[ShowcaseEntry]); 4] {
        [
            ("character names", self.character_names.as_slice()),
            ("quests", self.quests.as_slice()),
            ("magic items", self.magic_items.as_slice()),
            ("world lore", self.world_lore.as_slice()),
        ]
    }
}

/// Generate the showcase. Every sample is recorded in history; the first
/// failure aborts the whole showcase.
pub fn sample_assets(generator: &TextGenerator) -> Result<AssetShowcase> {
    let _span = tracing::info_span!("sample_assets").entered();
    let sample = |content_type: ContentType, seed: u64, temperature: f64| {
        let overrides = ParameterOverrides::new().seed(seed).temperature(temperature);
        generator
            .generate(content_type, &overrides)
            .map(|result| ShowcaseEntry {
                seed,
                temperature,
                text: result.output_text().to_string(),
            })
    };

    let character_names = NAME_TEMPERATURES
        .iter()
        .map(|&t| sample(ContentType::Name, 42, t))
        .collect::<Result<Vec<_>>>()?;
    let quests = QUEST_SEEDS
        .iter()
        .map(|&seed| sample(ContentType::Quest, seed, 0.7))
        .collect::<Result<Vec<_>>>()?;
    let magic_items = ITEM_SEEDS
        .map(|seed| sample(ContentType::Item, seed, 0.8))
        .collect::<Result<Vec<_>>>()?;
    let world_lore = LORE_TEMPERATURES
        .iter()
        .map(|&t| sample(ContentType::Lore, 42, t))
        .collect::<Result<Vec<_>>>()?;

    tracing::info!("showcase complete");
    Ok(AssetShowcase {
        model: generator.model_name().to_string(),
        generated_at: Utc::now(),
        character_names,
        quests,
        magic_items,
        world_lore,
    })
}
