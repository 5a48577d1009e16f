// Integration tests for cancellation and time budgets mid-generation
// This is a separate crate that tests the public API

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use loreweaver::core::HistoryLog;
use loreweaver::pipelines::{ContentType, StoryComposer};
use loreweaver::{
    CancellationToken, ErrorKind, GenerationControl, GenerationError, LanguageModel,
    ParameterOverrides, TextGenerator, ToyModel, WordTokenizer,
};

/// Toy model that never ends a text on its own. It flips `cancel` while
/// serving call number `cancel_after`, and sleeps `delay` on every call.
struct Interrupting {
    inner: ToyModel,
    eos: u32,
    calls: AtomicUsize,
    cancel_after: usize,
    cancel: CancellationToken,
    delay: Duration,
}

impl Interrupting {
    fn new(tokenizer: &WordTokenizer) -> Self {
        Self {
            inner: ToyModel::for_tokenizer(tokenizer),
            eos: tokenizer.eos_id(),
            calls: AtomicUsize::new(0),
            cancel_after: usize::MAX,
            cancel: CancellationToken::new(),
            delay: Duration::ZERO,
        }
    }
}

impl LanguageModel for Interrupting {
    fn next_token_logits(&self, context: &[u32]) -> anyhow::Result<Vec<f32>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.cancel_after {
            self.cancel.cancel();
        }
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let mut logits = self.inner.next_token_logits(context)?;
        logits[self.eos as usize] = f32::NEG_INFINITY;
        Ok(logits)
    }

    fn eos_token_id(&self) -> Option<u32> {
        Some(self.eos)
    }

    fn name(&self) -> &str {
        "interrupting-toy"
    }
}

fn generator(model: Interrupting, tokenizer: WordTokenizer) -> anyhow::Result<TextGenerator> {
    Ok(TextGenerator::builder(model, tokenizer)
        .history(Arc::new(HistoryLog::new()))
        .build()?)
}

#[test]
fn cancellation_mid_generation_reports_progress() -> anyhow::Result<()> {
    let tokenizer = WordTokenizer::fantasy();
    let cancel = CancellationToken::new();
    let model = Interrupting {
        cancel_after: 6,
        cancel: cancel.clone(),
        ..Interrupting::new(&tokenizer)
    };
    let generator = generator(model, tokenizer)?;

    let err = generator
        .generate_with(
            ContentType::Lore,
            &ParameterOverrides::new().seed(4),
            &GenerationControl::with_cancel(cancel),
        )
        .unwrap_err();
    assert!(
        matches!(err, GenerationError::Cancelled { produced: 6 }),
        "unexpected error: {err:?}"
    );
    assert!(generator.history().is_empty());
    Ok(())
}

#[test]
fn budget_expiring_mid_generation_times_out() -> anyhow::Result<()> {
    let tokenizer = WordTokenizer::fantasy();
    let model = Interrupting {
        delay: Duration::from_millis(15),
        ..Interrupting::new(&tokenizer)
    };
    let generator = generator(model, tokenizer)?;

    let err = generator
        .generate_with(
            ContentType::Lore,
            &ParameterOverrides::new().seed(4),
            &GenerationControl::with_budget(Duration::from_millis(60)),
        )
        .unwrap_err();
    match err {
        GenerationError::Timeout { budget, elapsed } => {
            assert_eq!(budget, Duration::from_millis(60));
            assert!(elapsed >= budget);
        }
        other => anyhow::bail!("expected a timeout, got {other:?}"),
    }
    assert!(generator.history().is_empty());
    Ok(())
}

#[test]
fn cancelled_story_records_no_field() -> anyhow::Result<()> {
    let tokenizer = WordTokenizer::fantasy();
    let cancel = CancellationToken::new();
    let model = Interrupting {
        cancel_after: 3,
        cancel: cancel.clone(),
        ..Interrupting::new(&tokenizer)
    };
    let generator = generator(model, tokenizer)?;

    let err = StoryComposer::new(&generator)
        .with_control(GenerationControl::with_cancel(cancel))
        .compose(Some(42), 0.7)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(generator.history().is_empty());
    Ok(())
}

#[test]
fn story_fields_finish_without_interruption() -> anyhow::Result<()> {
    let tokenizer = WordTokenizer::fantasy();
    let model = Interrupting::new(&tokenizer);
    let generator = generator(model, tokenizer)?;

    let story = StoryComposer::new(&generator)
        .with_control(GenerationControl::with_budget(Duration::from_secs(30)))
        .compose(Some(42), 0.7)?;
    for (_, field) in story.fields() {
        assert_eq!(field.tokens_generated(), field.params().max_length);
    }
    assert_eq!(generator.history().len(), 5);
    Ok(())
}
