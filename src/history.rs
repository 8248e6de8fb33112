// src/history.rs
//! Recent search terms.
//!
//! `RecentHistory` is a most-recent-first, deduplicated and bounded list of
//! keywords that produced results. Every mutation is written straight through
//! to its `HistoryStorage`. When the storage fails, on load or on any later
//! save, the store keeps working from memory for the rest of the session.

use crate::cache::HistoryStorage;
use crate::error::StorageError;
use std::collections::HashSet;

/// Terms kept when nothing else is configured
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

pub struct RecentHistory<S> {
    terms: Vec<String>,
    limit: usize,
    storage: S,
    persistent: bool,
}

impl<S: HistoryStorage> RecentHistory<S> {
    /// Load the persisted list from `storage`.
    ///
    /// Loaded data is cleaned up: blanks and repeats are dropped and the list
    /// is cut down to `limit`. A malformed list starts over empty and is
    /// replaced by the next save.
    pub fn open(storage: S, limit: usize) -> Self {
        let limit = limit.max(1);
        let (terms, persistent) = match storage.load() {
            Ok(raw) => (sanitize(raw, limit), true),
            Err(StorageError::Format(e)) => {
                log::warn!("Discarding malformed recent searches: {}", e);
                (Vec::new(), true)
            }
            Err(e) => {
                log::warn!("Recent searches unavailable, keeping them in memory only: {}", e);
                (Vec::new(), false)
            }
        };

        log::debug!("Loaded {} recent searches", terms.len());
        Self {
            terms,
            limit,
            storage,
            persistent,
        }
    }

    /// Terms, most recent first
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Whether mutations still reach the storage
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Entry at `index`, used when a recent term is picked by position
    pub fn get(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    /// Move `keyword` to the front, inserting it if new and evicting the
    /// oldest entries beyond the limit. Empty keywords are ignored.
    pub fn record(&mut self, keyword: &str) {
        if keyword.is_empty() {
            return;
        }

        self.terms.retain(|term| term != keyword);
        self.terms.insert(0, keyword.to_string());
        self.terms.truncate(self.limit);

        log::trace!("Recorded recent search {:?}", keyword);
        self.persist();
    }

    /// Drop `keyword` from the list. Returns whether it was present.
    pub fn remove(&mut self, keyword: &str) -> bool {
        let before = self.terms.len();
        self.terms.retain(|term| term != keyword);
        let removed = self.terms.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.terms.clear();
        self.persist();
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&mut self) {
        if !self.persistent {
            return;
        }
        if let Err(e) = self.storage.save(&self.terms) {
            log::warn!("Could not save recent searches, keeping them in memory only: {}", e);
            self.persistent = false;
        }
    }
}

fn sanitize(raw: Vec<String>, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter(|term| !term.is_empty())
        .filter(|term| seen.insert(term.clone()))
        .take(limit)
        .collect()
}
