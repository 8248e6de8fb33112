//! Runs dispatched queries off the event loop.
//!
//! Provides:
//! - `QueryDispatcher`, the seam between the session and whatever executes
//!   its tickets
//! - `SearchWorker`, a dispatcher running each ticket on its own thread
//!   against a `SearchSource` and reporting back over a channel.
//!
//! Transports cannot be aborted mid-request, so supersession is logical: a
//! worker that has not started yet checks the latest ticket id and skips
//! superseded work; anything already running finishes and is dropped by the
//! executor as stale.

use crate::error::SearchError;
use crate::query::{Completion, QueryTicket};
use crate::search::SearchSource;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

/// Something that can run query tickets and eventually report a `Completion`.
pub trait QueryDispatcher {
    fn dispatch(&mut self, ticket: QueryTicket);

    /// Every ticket below `latest_id` is no longer wanted.
    fn supersede(&mut self, _latest_id: u64) {}
}

/// Thread-per-query dispatcher
pub struct SearchWorker {
    source: Arc<dyn SearchSource>,
    completions: Sender<Completion>,
    latest_id: Arc<AtomicU64>,
}

impl SearchWorker {
    /// Create a worker and the receiving end its completions arrive on.
    pub fn new(source: Arc<dyn SearchSource>) -> (Self, Receiver<Completion>) {
        let (tx, rx) = unbounded();
        let worker = Self {
            source,
            completions: tx,
            latest_id: Arc::new(AtomicU64::new(0)),
        };
        (worker, rx)
    }
}

impl QueryDispatcher for SearchWorker {
    fn dispatch(&mut self, ticket: QueryTicket) {
        self.latest_id.store(ticket.id, Ordering::Release);

        let source = Arc::clone(&self.source);
        let completions = self.completions.clone();
        let latest_id = Arc::clone(&self.latest_id);
        let queued = ticket.clone();

        let spawned = thread::Builder::new()
            .name(format!("search-{}", ticket.id))
            .spawn(move || run_ticket(&latest_id, source.as_ref(), queued, &completions));

        if let Err(e) = spawned {
            report_spawn_failure(ticket, e, &self.completions);
        }
    }

    fn supersede(&mut self, latest_id: u64) {
        self.latest_id.fetch_max(latest_id, Ordering::AcqRel);
    }
}

/// A ticket that never got a thread still completes, as a failure.
fn report_spawn_failure(ticket: QueryTicket, error: io::Error, completions: &Sender<Completion>) {
    log::error!("Could not spawn search thread for ticket {}: {}", ticket.id, error);
    let outcome = Err(SearchError::Spawn(error));
    let _ = completions.send(Completion { ticket, outcome });
}

/// Body of a search thread. Returns false when the ticket was skipped.
fn run_ticket(
    latest_id: &AtomicU64,
    source: &dyn SearchSource,
    ticket: QueryTicket,
    completions: &Sender<Completion>,
) -> bool {
    if latest_id.load(Ordering::Acquire) != ticket.id {
        log::trace!("Ticket {} superseded before it started", ticket.id);
        return false;
    }

    let outcome = source.search(&ticket.keyword, ticket.search_type);
    // The receiver is gone once the session has shut down
    let _ = completions.send(Completion { ticket, outcome });
    true
}
