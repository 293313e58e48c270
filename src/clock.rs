//! Time sources. All timestamps are milliseconds since the Unix epoch.

use chrono::Utc;
use std::cell::Cell;

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

pub trait Clock {
    fn now(&self) -> i64;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<i64>,
}

impl ManualClock {
    pub fn new(now: i64) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn set(&self, now: i64) {
        self.now.set(now);
    }

    pub fn advance(&self, ms: i64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.get()
    }
}

/// Wall-clock time shifted by a number of simulated days.
///
/// Lets the user jump ahead to see cards come due without waiting.
#[derive(Debug, Default)]
pub struct OffsetClock {
    offset_days: Cell<i64>,
}

impl OffsetClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an offset saved in an earlier run.
    pub fn with_offset_days(days: i64) -> Self {
        Self {
            offset_days: Cell::new(days),
        }
    }

    pub fn advance_days(&self, days: i64) {
        self.offset_days.set(self.offset_days.get() + days);
    }

    pub fn offset_days(&self) -> i64 {
        self.offset_days.get()
    }
}

impl Clock for OffsetClock {
    fn now(&self) -> i64 {
        SystemClock.now() + self.offset_days.get() * DAY_MS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now(), 1_000);

        clock.advance(500);
        assert_eq!(clock.now(), 1_500);

        clock.set(42);
        assert_eq!(clock.now(), 42);
    }

    #[test]
    fn test_offset_clock_moves_forward_by_days() {
        let clock = OffsetClock::new();
        let before = SystemClock.now();
        clock.advance_days(2);
        let shifted = clock.now();

        assert_eq!(clock.offset_days(), 2);
        assert!(shifted >= before + 2 * DAY_MS);
    }

    #[test]
    fn test_offset_clock_resumes_saved_offset() {
        let clock = OffsetClock::with_offset_days(3);
        clock.advance_days(1);
        assert_eq!(clock.offset_days(), 4);
        assert!(clock.now() >= SystemClock.now() + 4 * DAY_MS - 1_000);
    }
}
