//! Rate gates for noisy input: a leading+trailing throttle and a
//! trailing debounce.
//!
//! Both are clock-injected state machines: callers pass `now` and poll on
//! their own tick, so they slot into the event loop without spawning timers.

use std::time::{Duration, Instant};

/// Fires at most once per `limit`.
///
/// The first call fires immediately.  Calls inside the window are
/// coalesced: only the latest value is kept, and it fires from [`poll`]
/// once `limit` has elapsed since the last firing.
///
/// [`poll`]: Throttle::poll
#[derive(Debug)]
pub struct Throttle<T> {
    limit: Duration,
    last_ran: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            last_ran: None,
            pending: None,
        }
    }

    /// Offer a value.  Returns it back if it should be acted on now.
    pub fn call(&mut self, now: Instant, value: T) -> Option<T> {
        match self.last_ran {
            Some(last) if now.saturating_duration_since(last) < self.limit => {
                self.pending = Some(value);
                None
            }
            _ => {
                self.last_ran = Some(now);
                self.pending = None;
                Some(value)
            }
        }
    }

    /// Release the trailing value once the window has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let last = self.last_ran?;
        if self.pending.is_some() && now.saturating_duration_since(last) >= self.limit {
            self.last_ran = Some(now);
            return self.pending.take();
        }
        None
    }
}

/// Fires `wait` after the most recent call, with that call's value.
#[derive(Debug)]
pub struct Debounce<T> {
    wait: Duration,
    deadline: Option<Instant>,
    pending: Option<T>,
}

impl<T> Debounce<T> {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            deadline: None,
            pending: None,
        }
    }

    /// Record a call, restarting the quiet window.
    pub fn call(&mut self, now: Instant, value: T) {
        self.deadline = Some(now + self.wait);
        self.pending = Some(value);
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }
}
