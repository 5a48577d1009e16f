pub mod cancel;
pub mod config;
pub mod error;
pub mod history;

pub use cancel::{CancellationToken, GenerationControl};
pub use config::GeneratorConfig;
pub use error::{ErrorKind, GenerationError, Result};
pub use history::{global_history, HistoryEntry, HistoryLog, HistoryRecord};
