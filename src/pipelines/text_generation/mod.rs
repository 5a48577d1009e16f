pub mod builder;
pub mod pipeline;
pub mod result;
pub mod truncate;

pub use builder::TextGeneratorBuilder;
pub use pipeline::TextGenerator;
pub use result::{GenerationRecord, GenerationResult, StopReason};
pub use truncate::truncate_to_sentence;
