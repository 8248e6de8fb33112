//! The search session controller.
//!
//! `SearchSession` ties the pieces together: keystrokes go through the
//! `Debouncer`, stabilized keywords go to the `QueryExecutor`, tickets are
//! handed to a `QueryDispatcher`, and the first successful non-empty
//! resolution of a keyword is recorded in the `RecentHistory`.
//!
//! Every method is an event handler and takes the current `Instant`; the
//! owner of the session runs the event loop and calls `tick` when
//! `next_deadline` passes and `settle` when a completion arrives.

use crate::cache::HistoryStorage;
use crate::config::SearchConfig;
use crate::debounce::Debouncer;
use crate::history::RecentHistory;
use crate::query::{Begin, Completion, QueryExecutor, QueryState, Settlement};
use crate::worker::QueryDispatcher;
use serde::Serialize;
use std::time::Instant;

/// Shown alongside results while there are at most this many
pub const RECENT_FOOTER_MAX_RESULTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing typed and nothing searched
    Idle,
    /// Waiting for the keyword to hold still
    Typing,
    /// Query issued, waiting for its completion
    Settled,
    /// Query finished, successfully or not
    Resolved,
}

pub struct SearchSession<D, S> {
    keyword: String,
    debounce: Debouncer<String>,
    query: QueryExecutor,
    history: RecentHistory<S>,
    dispatcher: D,
}

impl<D: QueryDispatcher, S: HistoryStorage> SearchSession<D, S> {
    /// Start a session. The recent-search list is loaded from `storage` now.
    pub fn new(config: &SearchConfig, dispatcher: D, storage: S) -> Self {
        Self {
            keyword: String::new(),
            debounce: Debouncer::new(String::new(), config.debounce),
            query: QueryExecutor::new(
                config.search_type,
                config.cache_ttl,
                config.search_empty_keyword,
            ),
            history: RecentHistory::open(storage, config.history_limit),
            dispatcher,
        }
    }

    /// Keyword as typed
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Keyword the current query belongs to
    pub fn stabilized_keyword(&self) -> &str {
        self.debounce.value()
    }

    pub fn result(&self) -> &QueryState {
        self.query.state()
    }

    /// Recent searches, most recent first
    pub fn history(&self) -> &[String] {
        self.history.terms()
    }

    pub fn recent(&self) -> &RecentHistory<S> {
        &self.history
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut D {
        &mut self.dispatcher
    }

    pub fn phase(&self) -> Phase {
        if self.debounce.is_pending() {
            return Phase::Typing;
        }

        let state = self.query.state();
        if state.is_fetching() {
            Phase::Settled
        } else if state.is_success() || state.is_error() {
            Phase::Resolved
        } else if self.keyword.is_empty() && self.stabilized_keyword().is_empty() {
            Phase::Idle
        } else {
            // Stabilized but never issued, e.g. suppressed or closed
            Phase::Resolved
        }
    }

    /// When `tick` should be called next, if a keystroke is pending
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// Input event: the keyword changed.
    pub fn set_keyword(&mut self, keyword: impl Into<String>, now: Instant) {
        let keyword = keyword.into();
        if self.debounce.update(keyword.clone(), now) {
            log::trace!("Keyword changed to {:?}", keyword);
        }
        self.keyword = keyword;
    }

    /// Put a recent term back into the input. Behaves exactly like typing it,
    /// so replaying the keyword already stabilized issues no query and leaves
    /// the recent list order alone.
    pub fn replay(&mut self, keyword: &str, now: Instant) {
        log::debug!("Replaying recent search {:?}", keyword);
        self.set_keyword(keyword, now);
    }

    /// Replay the recent term at `index`. Returns the term, if any.
    pub fn replay_index(&mut self, index: usize, now: Instant) -> Option<String> {
        let term = self.history.get(index)?.to_string();
        self.replay(&term, now);
        Some(term)
    }

    /// Timer event: propagate the keyword once it has held still. Returns true
    /// when a new stabilized keyword was produced.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(stabilized) = self.debounce.poll(now) else {
            return false;
        };

        log::debug!("Keyword settled on {:?}", stabilized);
        let begin = self.query.begin(&stabilized, now);
        self.apply_begin(begin);
        true
    }

    /// Completion event: a dispatched query finished.
    pub fn settle(&mut self, completion: Completion, now: Instant) -> Settlement {
        let settlement = self.query.settle(completion, now);
        if let Settlement::Succeeded(count) = settlement {
            self.record_success(count);
        }
        settlement
    }

    /// Run the current stabilized keyword again, skipping the memo.
    pub fn retry(&mut self) {
        let keyword = self.stabilized_keyword().to_string();
        log::debug!("Retrying search for {:?}", keyword);
        let begin = self.query.refetch(&keyword);
        self.apply_begin(begin);
    }

    /// Tear down: nothing pending fires and no in-flight result lands.
    pub fn close(&mut self) {
        self.debounce.cancel();
        self.keyword = self.debounce.value().clone();
        self.query.invalidate();
        self.dispatcher.supersede(self.query.latest_id());
    }

    /// Whether the recent-search footer should be shown
    pub fn shows_recent_history(&self) -> bool {
        let state = self.query.state();
        if state.is_fetching() {
            return false;
        }
        state
            .data()
            .map_or(true, |items| items.len() <= RECENT_FOOTER_MAX_RESULTS)
    }

    pub fn remove_recent(&mut self, keyword: &str) -> bool {
        self.history.remove(keyword)
    }

    pub fn clear_recent(&mut self) {
        self.history.clear();
    }

    fn apply_begin(&mut self, begin: Begin) {
        match begin {
            Begin::Dispatch(ticket) => self.dispatcher.dispatch(ticket),
            Begin::Cached => {
                self.dispatcher.supersede(self.query.latest_id());
                let count = self.query.state().data().map_or(0, |items| items.len());
                self.record_success(count);
            }
            Begin::Suppressed => self.dispatcher.supersede(self.query.latest_id()),
        }
    }

    // Called once per resolution, never on re-reads of the same state
    fn record_success(&mut self, count: usize) {
        let keyword = self.query.state().keyword().to_string();
        if count == 0 || keyword.is_empty() {
            return;
        }
        self.history.record(&keyword);
    }
}
