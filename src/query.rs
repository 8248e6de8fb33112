//! Query lifecycle and stale-response suppression.
//!
//! Defines:
//! - `QueryTicket`, the handle given to whoever runs a query
//! - `Completion`, a finished ticket travelling back to the executor
//! - `QueryState` with its `QueryStatus`, what the rendering layer reads
//! - `QueryExecutor`, which hands out tickets, memoizes results for a short
//!   window and only ever applies the completion of the latest ticket.

use crate::error::SearchError;
use crate::search::{ResultItem, SearchType};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// One issued query. Ids grow monotonically per executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    pub id: u64,
    pub keyword: String,
    pub search_type: SearchType,
}

/// A ticket together with what its source returned
#[derive(Debug)]
pub struct Completion {
    pub ticket: QueryTicket,
    pub outcome: Result<Vec<ResultItem>, SearchError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Pending,
    Success,
    Error,
}

/// What the rendering layer sees of the current query
#[derive(Debug, Clone)]
pub struct QueryState {
    keyword: String,
    status: QueryStatus,
    data: Option<Vec<ResultItem>>,
    error: Option<String>,
}

impl QueryState {
    fn idle(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            status: QueryStatus::Idle,
            data: None,
            error: None,
        }
    }

    /// Keyword this state belongs to
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn status(&self) -> QueryStatus {
        self.status
    }

    pub fn is_fetching(&self) -> bool {
        self.status == QueryStatus::Pending
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    /// Items of a successful query; `None` while idle, pending or failed
    pub fn data(&self) -> Option<&[ResultItem]> {
        self.data.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// How a call to `begin` was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Begin {
    /// A query must be run for this ticket
    Dispatch(QueryTicket),
    /// Served from the memo; the state is already successful
    Cached,
    /// Empty keyword with empty searches disabled; the state is idle
    Suppressed,
}

/// What applying a completion did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Superseded by a newer ticket and dropped
    Stale,
    /// Applied as a success holding this many items
    Succeeded(usize),
    /// Applied as a failure
    Failed,
}

#[derive(Debug)]
struct CacheEntry {
    items: Vec<ResultItem>,
    stored_at: Instant,
}

/// Issues tickets for stabilized keywords and applies their completions.
#[derive(Debug)]
pub struct QueryExecutor {
    search_type: SearchType,
    cache_ttl: Duration,
    search_empty: bool,
    last_id: u64,
    in_flight: Option<u64>,
    state: QueryState,
    cache: HashMap<String, CacheEntry>,
}

impl QueryExecutor {
    pub fn new(search_type: SearchType, cache_ttl: Duration, search_empty: bool) -> Self {
        Self {
            search_type,
            cache_ttl,
            search_empty,
            last_id: 0,
            in_flight: None,
            state: QueryState::idle(""),
            cache: HashMap::new(),
        }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// Id of the newest ticket handed out, 0 before the first one
    pub fn latest_id(&self) -> u64 {
        self.last_id
    }

    /// Ticket currently awaiting its completion
    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    /// Start a query for `keyword`, serving it from the memo when a fresh
    /// entry exists.
    pub fn begin(&mut self, keyword: &str, now: Instant) -> Begin {
        if keyword.is_empty() && !self.search_empty {
            self.supersede();
            self.state = QueryState::idle(keyword);
            log::trace!("Skipping query for empty keyword");
            return Begin::Suppressed;
        }

        if let Some(items) = self.cached(keyword, now) {
            log::debug!("Serving {:?} from memo ({} items)", keyword, items.len());
            self.supersede();
            self.state = QueryState {
                keyword: keyword.to_string(),
                status: QueryStatus::Success,
                data: Some(items),
                error: None,
            };
            return Begin::Cached;
        }

        Begin::Dispatch(self.issue(keyword))
    }

    /// Start a query for `keyword` without consulting the memo.
    pub fn refetch(&mut self, keyword: &str) -> Begin {
        if keyword.is_empty() && !self.search_empty {
            self.supersede();
            self.state = QueryState::idle(keyword);
            return Begin::Suppressed;
        }
        self.cache.remove(keyword);
        Begin::Dispatch(self.issue(keyword))
    }

    /// Apply a finished query. Anything but the latest ticket is dropped.
    pub fn settle(&mut self, completion: Completion, now: Instant) -> Settlement {
        let Completion { ticket, outcome } = completion;

        if self.in_flight != Some(ticket.id) {
            log::debug!(
                "Dropping stale result for {:?} (ticket {}, latest {})",
                ticket.keyword,
                ticket.id,
                self.last_id
            );
            return Settlement::Stale;
        }
        self.in_flight = None;

        match outcome {
            Ok(items) => {
                let count = items.len();
                self.remember(&ticket.keyword, &items, now);
                self.state = QueryState {
                    keyword: ticket.keyword,
                    status: QueryStatus::Success,
                    data: Some(items),
                    error: None,
                };
                Settlement::Succeeded(count)
            }
            Err(e) => {
                log::error!("Search for {:?} failed: {}", ticket.keyword, e);
                self.state = QueryState {
                    keyword: ticket.keyword,
                    status: QueryStatus::Error,
                    data: None,
                    error: Some(e.to_string()),
                };
                Settlement::Failed
            }
        }
    }

    /// Forget the in-flight ticket so its completion will be ignored.
    pub fn invalidate(&mut self) {
        self.supersede();
        if self.state.is_fetching() {
            self.state = QueryState::idle(&self.state.keyword);
        }
    }

    fn issue(&mut self, keyword: &str) -> QueryTicket {
        self.last_id += 1;
        self.in_flight = Some(self.last_id);
        self.state = QueryState {
            keyword: keyword.to_string(),
            status: QueryStatus::Pending,
            data: None,
            error: None,
        };

        log::trace!("Issuing ticket {} for {:?}", self.last_id, keyword);
        QueryTicket {
            id: self.last_id,
            keyword: keyword.to_string(),
            search_type: self.search_type,
        }
    }

    // Burn an id so any outstanding ticket becomes stale
    fn supersede(&mut self) {
        if self.in_flight.take().is_some() {
            self.last_id += 1;
        }
    }

    fn cached(&self, keyword: &str, now: Instant) -> Option<Vec<ResultItem>> {
        let entry = self.cache.get(keyword)?;
        if now.saturating_duration_since(entry.stored_at) < self.cache_ttl {
            Some(entry.items.clone())
        } else {
            None
        }
    }

    fn remember(&mut self, keyword: &str, items: &[ResultItem], now: Instant) {
        if self.cache_ttl.is_zero() {
            return;
        }
        let ttl = self.cache_ttl;
        self.cache
            .retain(|_, entry| now.saturating_duration_since(entry.stored_at) < ttl);
        self.cache.insert(
            keyword.to_string(),
            CacheEntry {
                items: items.to_vec(),
                stored_at: now,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::UserSummary;

    fn user(name: &str) -> ResultItem {
        ResultItem::User(UserSummary {
            id: name.to_string(),
            full_name: name.to_string(),
        })
    }

    fn ticket(begin: Begin) -> QueryTicket {
        match begin {
            Begin::Dispatch(ticket) => ticket,
            other => panic!("expected a dispatch, got {:?}", other),
        }
    }

    fn executor() -> QueryExecutor {
        QueryExecutor::new(SearchType::All, Duration::from_secs(30), false)
    }

    #[test]
    fn success_exposes_data() {
        let now = Instant::now();
        let mut exec = executor();

        let t = ticket(exec.begin("kim", now));
        assert!(exec.state().is_fetching());
        assert!(exec.state().data().is_none());

        let settled = exec.settle(
            Completion {
                ticket: t,
                outcome: Ok(vec![user("kim")]),
            },
            now,
        );
        assert_eq!(settled, Settlement::Succeeded(1));
        assert!(exec.state().is_success());
        assert!(!exec.state().is_fetching());
        assert_eq!(exec.state().data().map(|d| d.len()), Some(1));
    }

    #[test]
    fn stale_completion_is_dropped() {
        let now = Instant::now();
        let mut exec = executor();

        let a = ticket(exec.begin("a", now));
        let b = ticket(exec.begin("b", now));

        let late_b = exec.settle(
            Completion {
                ticket: b,
                outcome: Ok(vec![user("b")]),
            },
            now,
        );
        let late_a = exec.settle(
            Completion {
                ticket: a,
                outcome: Ok(vec![user("a"), user("aa")]),
            },
            now,
        );

        assert_eq!(late_b, Settlement::Succeeded(1));
        assert_eq!(late_a, Settlement::Stale);
        assert_eq!(exec.state().keyword(), "b");
        assert_eq!(exec.state().data(), Some(&[user("b")][..]));
    }

    #[test]
    fn failure_clears_data() {
        let now = Instant::now();
        let mut exec = executor();

        let t = ticket(exec.begin("x", now));
        let settled = exec.settle(
            Completion {
                ticket: t,
                outcome: Err(SearchError::Status(503)),
            },
            now,
        );

        assert_eq!(settled, Settlement::Failed);
        assert!(exec.state().is_error());
        assert!(!exec.state().is_fetching());
        assert!(exec.state().data().is_none());
        assert_eq!(exec.state().error(), Some("backend returned status 503"));
    }

    #[test]
    fn memo_serves_repeat_keyword_within_ttl() {
        let now = Instant::now();
        let mut exec = executor();

        let t = ticket(exec.begin("kim", now));
        exec.settle(
            Completion {
                ticket: t,
                outcome: Ok(vec![user("kim")]),
            },
            now,
        );
        exec.begin("lee", now);

        assert_eq!(exec.begin("kim", now + Duration::from_secs(5)), Begin::Cached);
        assert!(exec.state().is_success());
        assert_eq!(exec.state().keyword(), "kim");

        // Expired entries are fetched again
        assert!(matches!(
            exec.begin("kim", now + Duration::from_secs(31)),
            Begin::Dispatch(_)
        ));
    }

    #[test]
    fn memo_hit_supersedes_in_flight_ticket() {
        let now = Instant::now();
        let mut exec = executor();

        let kim = ticket(exec.begin("kim", now));
        exec.settle(
            Completion {
                ticket: kim,
                outcome: Ok(vec![user("kim")]),
            },
            now,
        );
        let lee = ticket(exec.begin("lee", now));
        assert_eq!(exec.begin("kim", now), Begin::Cached);

        let settled = exec.settle(
            Completion {
                ticket: lee,
                outcome: Ok(vec![user("lee")]),
            },
            now,
        );
        assert_eq!(settled, Settlement::Stale);
        assert_eq!(exec.state().keyword(), "kim");
    }

    #[test]
    fn failures_are_not_memoized() {
        let now = Instant::now();
        let mut exec = executor();

        let t = ticket(exec.begin("x", now));
        exec.settle(
            Completion {
                ticket: t,
                outcome: Err(SearchError::Status(500)),
            },
            now,
        );
        assert!(matches!(exec.begin("x", now), Begin::Dispatch(_)));
    }

    #[test]
    fn empty_keyword_policy() {
        let now = Instant::now();

        let mut suppressing = executor();
        assert_eq!(suppressing.begin("", now), Begin::Suppressed);
        assert_eq!(suppressing.state().status(), QueryStatus::Idle);
        assert_eq!(suppressing.latest_id(), 0);

        let mut firing = QueryExecutor::new(SearchType::All, Duration::ZERO, true);
        let t = ticket(firing.begin("", now));
        assert_eq!(t.keyword, "");
        assert!(firing.state().is_fetching());
    }

    #[test]
    fn refetch_bypasses_memo() {
        let now = Instant::now();
        let mut exec = executor();

        let t = ticket(exec.begin("kim", now));
        exec.settle(
            Completion {
                ticket: t,
                outcome: Ok(vec![user("kim")]),
            },
            now,
        );

        let again = ticket(exec.refetch("kim"));
        assert_eq!(again.id, 2);
        assert!(exec.state().is_fetching());
    }

    #[test]
    fn invalidate_drops_in_flight() {
        let now = Instant::now();
        let mut exec = executor();

        let t = ticket(exec.begin("kim", now));
        exec.invalidate();
        assert_eq!(exec.state().status(), QueryStatus::Idle);

        let settled = exec.settle(
            Completion {
                ticket: t,
                outcome: Ok(vec![user("kim")]),
            },
            now,
        );
        assert_eq!(settled, Settlement::Stale);
    }
}
