//! Commit id and timestamp allocation.
//!
//! A [`Sequencer`] is handed to every repository of a session. Clones share
//! one counter and one clock, so ids are unique across all repositories that
//! were built from the same sequencer.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::clock::{Clock, SystemClock};
use crate::commit::CommitId;

/// Shared id counter plus clock.
#[derive(Clone)]
pub struct Sequencer {
    next_id: Arc<AtomicU64>,
    clock: Arc<dyn Clock>,
}

impl Sequencer {
    /// Create a sequencer backed by the system clock, with ids starting at 0.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }

    /// Create a sequencer backed by a custom clock.
    #[must_use]
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            next_id: Arc::new(AtomicU64::new(0)),
            clock: Arc::new(clock),
        }
    }

    /// Allocate the next commit id.
    #[must_use]
    pub fn next_id(&self) -> CommitId {
        CommitId::from(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// The value the next call to [`Self::next_id`] will hand out.
    #[must_use]
    pub fn peek_next(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed)
    }

    /// Read the clock.
    #[must_use]
    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Restart ids at 0.
    ///
    /// Meant for test setup. Commits that are still alive keep their ids, so
    /// resetting while they exist produces duplicates.
    pub fn reset_ids(&self) {
        self.next_id.store(0, Ordering::Relaxed);
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Sequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequencer")
            .field("next_id", &self.peek_next())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SteppingClock;

    #[test]
    fn test_ids_increase_from_zero() {
        let seq = Sequencer::new();
        assert_eq!(seq.next_id(), "0");
        assert_eq!(seq.next_id(), "1");
        assert_eq!(seq.next_id(), "2");
        assert_eq!(seq.peek_next(), 3);
    }

    #[test]
    fn test_clones_share_counter() {
        let a = Sequencer::new();
        let b = a.clone();
        assert_eq!(a.next_id(), "0");
        assert_eq!(b.next_id(), "1");
        assert_eq!(a.next_id(), "2");
    }

    #[test]
    fn test_independent_sequencers_do_not_share() {
        let a = Sequencer::new();
        let b = Sequencer::new();
        assert_eq!(a.next_id(), "0");
        assert_eq!(b.next_id(), "0");
    }

    #[test]
    fn test_reset_ids() {
        let seq = Sequencer::new();
        let _ = seq.next_id();
        let _ = seq.next_id();
        seq.reset_ids();
        assert_eq!(seq.next_id(), "0");
    }

    #[test]
    fn test_custom_clock() {
        let seq = Sequencer::with_clock(SteppingClock::new(1_000, 10));
        let shared = seq.clone();
        assert_eq!(seq.now_millis(), 1_000);
        assert_eq!(shared.now_millis(), 1_010);
        assert_eq!(seq.now_millis(), 1_020);
    }
}
