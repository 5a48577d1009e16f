pub mod core;
pub mod models;
pub mod pipelines;

/// Default sampling temperature when neither a template nor the caller sets one.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TOP_K: usize = 50;
pub const DEFAULT_TOP_P: f64 = 0.95;
/// Default budget of generated tokens for untemplated prompts.
pub const DEFAULT_MAX_LENGTH: usize = 50;
/// Largest `max_length` a generator accepts unless configured otherwise.
pub const DEFAULT_MAX_LENGTH_CEILING: usize = 512;

// Re-export core types
pub use self::core::{
    CancellationToken, ErrorKind, GenerationControl, GenerationError, GeneratorConfig,
    HistoryEntry, HistoryLog, Result,
};

// Re-export model types for easier access
pub use models::generation::{DecodingParameters, ParameterOverrides};
pub use models::{
    CandleLanguageModel, HfTokenizer, LanguageModel, TextTokenizer, ToyModel, WordTokenizer,
};

pub use pipelines::{
    ContentType, ExperimentReport, ExperimentRunner, GenerationResult, StoryResult, Sweep,
    TextGenerator, TextGeneratorBuilder,
};
