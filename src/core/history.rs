//! Append-only log of finished generations.
//!
//! The log keeps every completed [`GenerationResult`] and [`StoryResult`]
//! in the order appends happened. Entries are never removed; writing them
//! out (JSON, CSV, a database) is left to the host, which reads them back
//! through [`HistoryLog::all`] or [`HistoryLog::to_records`].

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::pipelines::story::{StoryRecord, StoryResult};
use crate::pipelines::text_generation::{GenerationRecord, GenerationResult};

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    Generation(GenerationResult),
    Story(StoryResult),
}

/// Persisted form of a [`HistoryEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryRecord {
    Generation(GenerationRecord),
    Story(StoryRecord),
}

impl From<&HistoryEntry> for HistoryRecord {
    fn from(entry: &HistoryEntry) -> Self {
        match entry {
            HistoryEntry::Generation(result) => Self::Generation(result.to_record()),
            HistoryEntry::Story(story) => Self::Story(story.to_record()),
        }
    }
}

/// Thread-safe, append-only sequence of history entries.
///
/// Each append takes the write lock once, so entries from concurrent
/// writers never interleave partially and none are lost. Across writers,
/// order is whatever order the lock was granted in.
#[derive(Debug, Default)]
pub struct HistoryLog {
    entries: RwLock<Vec<HistoryEntry>>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, entry: HistoryEntry) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.push(entry);
    }

    /// Append several entries as one contiguous block.
    pub fn append_all(&self, batch: impl IntoIterator<Item = HistoryEntry>) {
        let batch: Vec<HistoryEntry> = batch.into_iter().collect();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.extend(batch);
    }

    /// Snapshot of every entry, oldest first.
    pub fn all(&self) -> Vec<HistoryEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The most recent entry, if any.
    pub fn last(&self) -> Option<HistoryEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn to_records(&self) -> Vec<HistoryRecord> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(HistoryRecord::from)
            .collect()
    }
}

/// Process-wide history shared by every generator that is not handed its own.
static GLOBAL_HISTORY: once_cell::sync::Lazy<Arc<HistoryLog>> =
    once_cell::sync::Lazy::new(|| Arc::new(HistoryLog::new()));

/// Get a handle to the process-wide history log.
pub fn global_history() -> Arc<HistoryLog> {
    Arc::clone(&GLOBAL_HISTORY)
}
