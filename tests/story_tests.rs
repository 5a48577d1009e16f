// Integration tests for story composition
// This is a separate crate that tests the public API

use std::sync::Arc;

use loreweaver::core::HistoryLog;
use loreweaver::pipelines::story::field_seed;
use loreweaver::{HistoryEntry, TextGenerator, ToyModel};

fn generator() -> anyhow::Result<TextGenerator> {
    let (model, tokenizer) = ToyModel::fantasy();
    Ok(TextGenerator::builder(model, tokenizer)
        .history(Arc::new(HistoryLog::new()))
        .build()?)
}

fn texts(story: &loreweaver::StoryResult) -> Vec<String> {
    story
        .fields()
        .iter()
        .map(|(_, field)| field.output_text().to_string())
        .collect()
}

#[test]
fn same_seed_same_story() -> anyhow::Result<()> {
    let generator = generator()?;
    let a = generator.compose_story(Some(42), 0.7)?;
    let b = generator.compose_story(Some(42), 0.7)?;
    assert_eq!(texts(&a), texts(&b));
    assert_eq!(a.seed(), 42);
    Ok(())
}

#[test]
fn temperature_changes_the_story() -> anyhow::Result<()> {
    let generator = generator()?;
    let cool = generator.compose_story(Some(42), 0.3)?;
    let hot = generator.compose_story(Some(42), 1.8)?;
    assert_ne!(texts(&cool), texts(&hot));

    let seeds = |story: &loreweaver::StoryResult| -> Vec<u64> {
        story.fields().iter().map(|(_, f)| f.seed()).collect()
    };
    assert_eq!(seeds(&cool), seeds(&hot));
    assert_eq!(seeds(&cool), (0..4).map(|i| field_seed(42, i)).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn fields_use_distinct_derived_seeds() -> anyhow::Result<()> {
    let generator = generator()?;
    let story = generator.compose_story(Some(7), 0.7)?;
    let seeds: Vec<u64> = story.fields().iter().map(|(_, f)| f.seed()).collect();
    let expected: Vec<u64> = (0..4).map(|i| field_seed(7, i)).collect();
    assert_eq!(seeds, expected);
    Ok(())
}

#[test]
fn story_lands_in_history_as_one_block() -> anyhow::Result<()> {
    let generator = generator()?;
    let story = generator.compose_story(Some(11), 0.7)?;
    let history = generator.history();
    assert_eq!(history.len(), 5);
    match &history[4] {
        HistoryEntry::Story(recorded) => assert_eq!(recorded, &story),
        other => anyhow::bail!("expected a story entry, got {other:?}"),
    }

    let record = serde_json::to_value(generator.history_log().to_records())?;
    assert_eq!(record[4]["kind"], "story");
    assert_eq!(record[4]["quest"]["content_type"], "quest");
    Ok(())
}

#[test]
fn invalid_temperature_records_nothing() -> anyhow::Result<()> {
    let generator = generator()?;
    let err = generator.compose_story(Some(1), 0.0).unwrap_err();
    assert_eq!(err.field(), Some("temperature"));
    assert!(generator.history().is_empty());
    Ok(())
}
