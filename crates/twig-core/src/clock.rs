//! Trait abstraction for the time source used to stamp commits.
//!
//! Commit timestamps are the only ordering key [`crate::Repository::synchronize`]
//! looks at, so the clock is injected rather than read directly. This allows:
//! - Deterministic timestamps (and forced ties) in tests
//! - Reproducible scripted sessions

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// A source of millisecond timestamps.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// Wall-clock time that never moves backwards.
///
/// If the system clock steps back, the last reading is repeated instead, so
/// chains built from one `SystemClock` keep non-increasing timestamps from
/// head to tail.
#[derive(Debug)]
pub struct SystemClock {
    last: AtomicI64,
}

impl SystemClock {
    /// Create a new system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: AtomicI64::new(i64::MIN),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = self.last.fetch_max(now, Ordering::AcqRel);
        now.max(previous)
    }
}

/// A deterministic clock: starts at `start` and advances by `step` on every
/// reading. A `step` of zero hands out the same timestamp forever.
///
/// Readings saturate at `i64::MIN`/`i64::MAX` instead of wrapping.
#[derive(Debug)]
pub struct SteppingClock {
    next: AtomicI64,
    step: i64,
}

impl SteppingClock {
    /// Create a clock whose first reading is `start`.
    #[must_use]
    pub const fn new(start: i64, step: i64) -> Self {
        Self {
            next: AtomicI64::new(start),
            step,
        }
    }

    /// Jump the clock so the next reading is `millis`.
    pub fn set(&self, millis: i64) {
        self.next.store(millis, Ordering::Release);
    }
}

impl Clock for SteppingClock {
    fn now_millis(&self) -> i64 {
        let step = self.step;
        match self
            .next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |next| {
                Some(next.saturating_add(step))
            }) {
            Ok(current) | Err(current) => current,
        }
    }
}
