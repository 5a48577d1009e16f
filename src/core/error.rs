use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type returned by every generation entry point.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The caller supplied a decoding parameter outside its valid range.
    /// Raised before any model call and never retried.
    #[error("invalid parameter `{field}`: {constraint}")]
    InvalidParameter {
        field: &'static str,
        constraint: String,
    },

    /// The model or tokenizer could not produce what was asked of it.
    #[error("model unavailable: {0}")]
    ModelUnavailable(#[source] anyhow::Error),

    /// Inference ran past the caller's time budget.
    #[error("generation exceeded its {budget:?} budget after {elapsed:?}")]
    Timeout { budget: Duration, elapsed: Duration },

    /// The caller cancelled the call at a token boundary.
    #[error("generation cancelled after {produced} tokens")]
    Cancelled { produced: usize },
}

impl GenerationError {
    pub(crate) fn invalid(field: &'static str, constraint: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            constraint: constraint.into(),
        }
    }

    /// Coarse, serializable classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            Self::ModelUnavailable(_) => ErrorKind::ModelUnavailable,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    /// Name of the offending field for parameter errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidParameter { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidParameter,
    ModelUnavailable,
    Timeout,
    Cancelled,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::InvalidParameter => "invalid_parameter",
            Self::ModelUnavailable => "model_unavailable",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
