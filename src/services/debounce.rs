//! Deadline-based coalescing buffer.
//!
//! `push` arms (or re-arms) the deadline; the buffer is due once `delay` has
//! passed since the last push; `flush` drains it and disarms. No timer is
//! owned here: the runtime sleeps until [`Debouncer::deadline`].

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Vec<T>,
    deadline: Option<Instant>,
}

impl<T: PartialEq> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Vec::new(),
            deadline: None,
        }
    }

    /// Queues `item` (once) and restarts the quiet interval.
    pub fn push(&mut self, item: T, now: Instant) {
        if !self.pending.contains(&item) {
            self.pending.push(item);
        }
        self.deadline = Some(now + self.delay);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Drains everything queued, in arrival order.
    pub fn flush(&mut self) -> Vec<T> {
        self.deadline = None;
        std::mem::take(&mut self.pending)
    }

    /// Drains only if the quiet interval has elapsed.
    pub fn take_due(&mut self, now: Instant) -> Option<Vec<T>> {
        if self.is_due(now) {
            Some(self.flush())
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.pending.contains(item)
    }

    /// Drops queued items and disarms.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.deadline = None;
    }
}
