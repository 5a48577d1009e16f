// Pipeline modules organized by functionality
pub mod experiment;
pub mod showcase;
pub mod story;
pub mod templates;
pub mod text_generation;

// Re-export generation types for convenience
pub use text_generation::*;

// Re-export the higher-level pipelines
pub use experiment::{
    ExperimentReport, ExperimentRunner, Parameter, ParameterValue, RunOutcome, Sweep,
};
pub use showcase::{sample_assets, AssetShowcase};
pub use story::{StoryComposer, StoryRecord, StoryResult};
pub use templates::{ContentTemplate, ContentType};
