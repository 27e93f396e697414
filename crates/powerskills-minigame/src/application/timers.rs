//! Pending timers owned by a mounted game.
//!
//! The engine never sleeps. Timers are deadlines checked on every `tick`;
//! dropping the queue cancels everything still pending.

use chrono::{DateTime, Duration, Utc};

/// Deadline-ordered queue of pending actions.
#[derive(Debug)]
pub struct TimerQueue<A> {
    pending: Vec<(DateTime<Utc>, A)>,
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<A> TimerQueue<A> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `action` at `at`. Actions with equal deadlines fire in
    /// scheduling order.
    pub fn schedule(&mut self, at: DateTime<Utc>, action: A) {
        let index = self.pending.partition_point(|(due, _)| *due <= at);
        self.pending.insert(index, (at, action));
    }

    /// Schedules `action` `delay_ms` after `now`.
    pub fn schedule_after(&mut self, now: DateTime<Utc>, delay_ms: u64, action: A) {
        let delay = Duration::milliseconds(i64::try_from(delay_ms).unwrap_or(i64::MAX));
        self.schedule(now.checked_add_signed(delay).unwrap_or(now), action);
    }

    /// Removes and returns every action due at or before `now`.
    pub fn due(&mut self, now: DateTime<Utc>) -> Vec<A> {
        let split = self.pending.partition_point(|(due, _)| *due <= now);
        self.pending.drain(..split).map(|(_, action)| action).collect()
    }

    /// Drops every pending action.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Number of pending actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
