//! Recent search history.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::storage::{get_json, set_json, KeyValueStore};

/// Storage key for the history list.
pub const HISTORY_KEY: &str = "beefline-search-history";

/// Maximum number of entries kept.
pub const MAX_HISTORY: usize = 5;

/// One recorded search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub query: String,
    pub timestamp: DateTime<Utc>,
}

/// Most-recent-first list of submitted search terms.
#[derive(Clone)]
pub struct SearchHistory {
    store: Arc<dyn KeyValueStore>,
}

impl SearchHistory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load entries, newest first.
    ///
    /// Unreadable stored data is treated as an empty history.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        match get_json::<Vec<HistoryEntry>, _>(self.store.as_ref(), HISTORY_KEY) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable search history");
                Vec::new()
            }
        }
    }

    /// Record a submitted search term.
    ///
    /// Blank terms are ignored. A term already present moves to the front.
    pub fn record(&self, query: &str) -> Result<Vec<HistoryEntry>, StorageError> {
        self.record_at(query, Utc::now())
    }

    fn record_at(&self, query: &str, at: DateTime<Utc>) -> Result<Vec<HistoryEntry>, StorageError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(self.entries());
        }

        let mut entries = self.entries();
        entries.retain(|entry| entry.query != query);
        entries.insert(
            0,
            HistoryEntry {
                query: query.to_string(),
                timestamp: at,
            },
        );
        entries.truncate(MAX_HISTORY);

        set_json(self.store.as_ref(), HISTORY_KEY, &entries)?;
        tracing::debug!(query, entries = entries.len(), "recorded search");
        Ok(entries)
    }

    /// Forget every entry.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.clear(HISTORY_KEY)
    }
}
