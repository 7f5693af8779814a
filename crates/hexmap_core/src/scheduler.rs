//! Delayed continuations on the single editor thread.
//!
//! The host advances a millisecond clock; continuations that come due are
//! handed back in the order they were scheduled. Nothing runs concurrently
//! with other mutations.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Work deferred to a later tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deferred {
    /// Start the next combat round.
    AdvanceRound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scheduled {
    due_ms: u64,
    seq: u64,
    task: Deferred,
}

/// Millisecond-clock continuation queue.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: u64,
    next_seq: u64,
    queue: Vec<Scheduled>,
}

impl Scheduler {
    /// Empty scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value.
    #[must_use]
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Run `task` once `delay_ms` have elapsed.
    pub fn schedule(&mut self, task: Deferred, delay_ms: u64) {
        let due_ms = self.now_ms.saturating_add(delay_ms);
        debug!(?task, due_ms, "scheduled");
        self.queue.push(Scheduled {
            due_ms,
            seq: self.next_seq,
            task,
        });
        self.next_seq += 1;
    }

    /// Whether `task` is waiting.
    #[must_use]
    pub fn is_pending(&self, task: Deferred) -> bool {
        self.queue.iter().any(|s| s.task == task)
    }

    /// Number of waiting continuations.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drop every waiting continuation.
    pub fn cancel_all(&mut self) {
        self.queue.clear();
    }

    /// Advance the clock and take the continuations now due.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<Deferred> {
        self.now_ms = self.now_ms.saturating_add(elapsed_ms);
        let now = self.now_ms;
        let (mut due, waiting): (Vec<_>, Vec<_>) =
            self.queue.drain(..).partition(|s| s.due_ms <= now);
        self.queue = waiting;
        due.sort_by_key(|s| (s.due_ms, s.seq));
        due.into_iter().map(|s| s.task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_after_delay() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Deferred::AdvanceRound, 100);

        assert!(scheduler.advance(99).is_empty());
        assert!(scheduler.is_pending(Deferred::AdvanceRound));
        assert_eq!(scheduler.advance(1), vec![Deferred::AdvanceRound]);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.now_ms(), 100);
    }

    #[test]
    fn test_zero_delay_runs_on_next_advance() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Deferred::AdvanceRound, 0);
        assert_eq!(scheduler.advance(0).len(), 1);
    }

    #[test]
    fn test_cancel_all() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Deferred::AdvanceRound, 10);
        scheduler.cancel_all();
        assert!(scheduler.advance(50).is_empty());
    }
}
