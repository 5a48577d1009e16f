use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Cloneable flag a caller flips to stop an in-flight generation at the
/// next token boundary.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Per-call limits checked before every model invocation.
#[derive(Debug, Clone, Default)]
pub struct GenerationControl {
    pub budget: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl GenerationControl {
    pub fn with_budget(budget: Duration) -> Self {
        Self {
            budget: Some(budget),
            cancel: None,
        }
    }

    pub fn with_cancel(cancel: CancellationToken) -> Self {
        Self {
            budget: None,
            cancel: Some(cancel),
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}
