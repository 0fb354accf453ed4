//! Session-local, append-only log of completed roll actions.
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::outcome::RollOutcome;

/// Totals shown next to a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub sum: i64,
}

/// One completed roll action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub time: String,
    pub summary: HistorySummary,
    pub details: Vec<RollOutcome>,
}

impl HistoryEntry {
    /// Entry for `details`, totalling every roll's `sum`.
    #[must_use]
    pub fn new(time: impl Into<String>, details: Vec<RollOutcome>) -> Self {
        let sum = details.iter().map(|roll| roll.sum).sum();
        Self {
            time: time.into(),
            summary: HistorySummary { sum },
            details,
        }
    }
}

/// Newest-first log of roll actions. Entries are never edited or evicted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend an entry for a completed action and return it.
    pub fn record(&mut self, time: impl Into<String>, details: Vec<RollOutcome>) -> &HistoryEntry {
        self.entries.push_front(HistoryEntry::new(time, details));
        &self.entries[0]
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Display timestamp in the local time zone, e.g. `14:03:27`.
#[must_use]
pub fn local_time_label() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
