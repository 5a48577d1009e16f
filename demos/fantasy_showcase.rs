use anyhow::Result;
use loreweaver::pipelines::experiment::presets;
use loreweaver::pipelines::{sample_assets, ContentType};
use loreweaver::{ParameterOverrides, TextGenerator, ToyModel};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("loreweaver=info")),
        )
        .init();

    // 1. Build a generator over the bundled toy model
    let (model, tokenizer) = ToyModel::fantasy();
    let generator = TextGenerator::builder(model, tokenizer)
        .temperature(0.7)
        .build()?;
    println!("Generator ready ({}).", generator.model_name());

    // 2. One asset of each type
    println!("\n--- Asset Showcase ---");
    let showcase = sample_assets(&generator)?;
    for (section, entries) in showcase.sections() {
        println!("\n{section}:");
        for entry in entries {
            println!(
                "  [seed {:>4}, t={:.1}] {}",
                entry.seed, entry.temperature, entry.text
            );
        }
    }

    // 3. A full story from one seed
    println!("\n--- Story (seed 42) ---");
    let story = generator.compose_story(Some(42), 0.7)?;
    for (field, result) in story.fields() {
        println!("{field:>10}: {}", result.output_text());
    }

    // 4. Replaying a seed gives the same text
    let overrides = ParameterOverrides::new().seed(2024);
    let first = generator.generate(ContentType::Quest, &overrides)?;
    let again = generator.generate(ContentType::Quest, &overrides)?;
    println!(
        "\nReplay of seed 2024 matches: {}",
        first.output_text() == again.output_text()
    );

    // 5. Parameter experiments
    for report in presets::all(&generator) {
        println!("\n--- Experiment: {} ---", report.name);
        println!("{}", report.to_table());
    }

    // 6. Everything above is in the history log
    let records = generator.history_log().to_records();
    println!("\n{} history entries recorded.", records.len());
    if let Some(last) = records.last() {
        println!("Last entry:\n{}", serde_json::to_string_pretty(last)?);
    }

    Ok(())
}
