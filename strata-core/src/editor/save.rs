//! Debounced persistence scheduling.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SaveStatus {
    #[default]
    Idle,
    /// A write is scheduled but the quiet period has not elapsed.
    Pending,
    Saving,
    Saved,
    Failed(String),
}

/// One cancellable deadline. A new request supersedes the pending one.
#[derive(Debug, Clone)]
pub struct SaveScheduler {
    debounce: Duration,
    deadline: Option<Instant>,
}

impl SaveScheduler {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.debounce);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}
