//! Keystroke debouncing.
//!
//! A `Debouncer` holds the latest input and the last value that stayed
//! unchanged for the whole quiet interval. The caller owns the clock: every
//! method takes the current `Instant`, and `deadline` tells the event loop
//! when to come back and `poll`.

use std::time::{Duration, Instant};

/// A scheduled propagation of the latest input
#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    due: Instant,
}

/// Delays a rapidly changing value until it holds still for `delay`.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    latest: T,
    stable: T,
    pending: Option<Pending<T>>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    /// Both the input and the stabilized value start at `initial`.
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            delay,
            latest: initial.clone(),
            stable: initial,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Latest raw input
    pub fn input(&self) -> &T {
        &self.latest
    }

    /// Last value that held still for the full quiet interval
    pub fn value(&self) -> &T {
        &self.stable
    }

    /// Feed a new input value.
    ///
    /// A different value replaces whatever was pending and restarts the quiet
    /// interval. Returns false when `value` equals the latest input, in which
    /// case nothing is rescheduled.
    pub fn update(&mut self, value: T, now: Instant) -> bool {
        if value == self.latest {
            return false;
        }

        self.latest = value.clone();
        self.pending = Some(Pending {
            value,
            due: now + self.delay,
        });
        true
    }

    /// Propagate the pending value if its quiet interval has elapsed.
    ///
    /// Yields the new stabilized value only when it differs from the previous
    /// one.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = self.pending.as_ref()?.due;
        if now < due {
            return None;
        }

        let Pending { value, .. } = self.pending.take()?;
        if value == self.stable {
            return None;
        }

        self.stable = value.clone();
        Some(value)
    }

    /// When the pending value will be due, if anything is pending
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Remaining quiet time before the pending value propagates
    pub fn time_until_ready(&self, now: Instant) -> Option<Duration> {
        self.deadline().map(|due| due.saturating_duration_since(now))
    }

    /// Drop the pending propagation; the stabilized value stays as it was
    /// and the input rewinds to it.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.latest = self.stable.clone();
    }
}
