//! Time source abstraction.
//!
//! Backup names, seeded entry ids and merge id allocation all read the current
//! time. Routing every read through [`Clock`] lets tests pin it.

use chrono::{DateTime, Duration, Local};
use std::sync::Mutex;

/// A source of the current local time.
pub trait Clock: Send + Sync {
    /// Returns the current time in the process-local timezone.
    fn now(&self) -> DateTime<Local>;
}

/// The real wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A manually driven clock for deterministic tests.
///
/// Every call to `now` returns the current instant and then advances it by
/// `step`, so consecutive snapshots land in distinct seconds when `step` is at
/// least one second.
#[derive(Debug)]
pub struct FixedClock {
    current: Mutex<DateTime<Local>>,
    step: Duration,
}

impl FixedClock {
    /// Creates a clock frozen at `start`.
    pub fn new(start: DateTime<Local>) -> Self {
        Self::stepping(start, Duration::zero())
    }

    /// Creates a clock starting at `start` that advances `step` per read.
    pub fn stepping(start: DateTime<Local>, step: Duration) -> Self {
        Self {
            current: Mutex::new(start),
            step,
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        let now = *current;
        *current += self.step;
        now
    }
}
