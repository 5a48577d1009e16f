//! Four-part stories generated from one seed.
//!
//! A story is a hero name, a quest, a magic item and a piece of world lore.
//! Each field gets its own seed derived from the story seed and the field's
//! position, so fields never share a random stream and any single field can
//! be regenerated on its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{GenerationControl, GenerationError, HistoryEntry, Result};
use crate::models::generation::{derive_seed, ParameterOverrides, SeedController};
use crate::pipelines::templates::ContentType;
use crate::pipelines::text_generation::{GenerationRecord, GenerationResult, TextGenerator};

/// Story fields in derivation order.
pub const STORY_FIELDS: [(&str, ContentType); 4] = [
    ("hero_name", ContentType::Name),
    ("quest", ContentType::Quest),
    ("magic_item", ContentType::Item),
    ("world_lore", ContentType::Lore),
];

#[derive(Debug, Clone, PartialEq)]
pub struct StoryResult {
    hero_name: GenerationResult,
    quest: GenerationResult,
    magic_item: GenerationResult,
    world_lore: GenerationResult,
    seed: u64,
    temperature: f64,
    timestamp: DateTime<Utc>,
}

impl StoryResult {
    pub fn hero_name(&self) -> &GenerationResult {
        &self.hero_name
    }

    pub fn quest(&self) -> &GenerationResult {
        &self.quest
    }

    pub fn magic_item(&self) -> &GenerationResult {
        &self.magic_item
    }

    pub fn world_lore(&self) -> &GenerationResult {
        &self.world_lore
    }

    /// Story-level seed every field seed is derived from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Fields in derivation order, paired with their names.
    pub fn fields(&self) -> [(&'static str, &GenerationResult); 4] {
        [
            (STORY_FIELDS[0].0, &self.hero_name),
            (STORY_FIELDS[1].0, &self.quest),
            (STORY_FIELDS[2].0, &self.magic_item),
            (STORY_FIELDS[3].0, &self.world_lore),
        ]
    }

    pub fn to_record(&self) -> StoryRecord {
        StoryRecord {
            seed: self.seed,
            temperature: self.temperature,
            timestamp: self.timestamp,
            hero_name: self.hero_name.to_record(),
            quest: self.quest.to_record(),
            magic_item: self.magic_item.to_record(),
            world_lore: self.world_lore.to_record(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryRecord {
    pub seed: u64,
    pub temperature: f64,
    pub timestamp: DateTime<Utc>,
    pub hero_name: GenerationRecord,
    pub quest: GenerationRecord,
    pub magic_item: GenerationRecord,
    pub world_lore: GenerationRecord,
}

/// Seed used for story field `index` under story seed `seed`.
pub fn field_seed(seed: u64, index: usize) -> u64 {
    derive_seed(seed, index as u64)
}

/// Composes stories on top of a [`TextGenerator`].
pub struct StoryComposer<'a> {
    generator: &'a TextGenerator,
    control: GenerationControl,
}

impl<'a> StoryComposer<'a> {
    pub fn new(generator: &'a TextGenerator) -> Self {
        Self {
            generator,
            control: GenerationControl::default(),
        }
    }

    /// Apply `control` to every field's generation.
    pub fn with_control(mut self, control: GenerationControl) -> Self {
        self.control = control;
        self
    }

    /// Generate all four fields and record them.
    ///
    /// Fields run on their own threads. Nothing reaches the history log
    /// unless every field succeeds; then the four field results and the
    /// story itself are appended as one block.
    pub fn compose(&self, seed: Option<u64>, temperature: f64) -> Result<StoryResult> {
        if !(temperature.is_finite() && temperature > 0.0) {
            return Err(GenerationError::invalid(
                "temperature",
                format!("must be a finite value > 0, got {temperature}"),
            ));
        }
        let seed = SeedController::effective_seed(seed);
        let _span = tracing::info_span!("compose_story", seed, temperature).entered();

        let requests: Vec<_> = STORY_FIELDS
            .iter()
            .enumerate()
            .map(|(index, &(_, content_type))| {
                let overrides = ParameterOverrides::new()
                    .temperature(temperature)
                    .seed(field_seed(seed, index));
                (content_type, self.generator.params_for(content_type, &overrides))
            })
            .collect();
        for (_, params) in &requests {
            params.validate(self.generator.config().max_length_ceiling)?;
        }

        let generator = self.generator;
        let control = &self.control;
        let outcomes: Vec<Result<GenerationResult>> = std::thread::scope(|scope| {
            let handles: Vec<_> = requests
                .into_iter()
                .map(|(content_type, params)| {
                    scope.spawn(move || generator.complete(params, content_type, control))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        Err(GenerationError::ModelUnavailable(anyhow::anyhow!(
                            "story field worker panicked"
                        )))
                    })
                })
                .collect()
        });
        let fields = outcomes.into_iter().collect::<Result<Vec<_>>>()?;
        let [hero_name, quest, magic_item, world_lore]: [GenerationResult; 4] =
            fields.try_into().map_err(|fields: Vec<GenerationResult>| {
                GenerationError::ModelUnavailable(anyhow::anyhow!(
                    "expected 4 story fields, got {}",
                    fields.len()
                ))
            })?;

        let story = StoryResult {
            hero_name,
            quest,
            magic_item,
            world_lore,
            seed,
            temperature,
            timestamp: Utc::now(),
        };

        let mut batch: Vec<HistoryEntry> = story
            .fields()
            .iter()
            .map(|(_, result)| HistoryEntry::Generation((*result).clone()))
            .collect();
        batch.push(HistoryEntry::Story(story.clone()));
        self.generator.history_log().append_all(batch);

        tracing::info!(hero = story.hero_name.output_text(), "composed story");
        Ok(story)
    }
}
