//! Time sources for transaction and block timestamps.
//!
//! Production code uses [`SystemClock`]; tests inject a [`ManualClock`] so
//! that ordering assertions do not depend on wall-clock resolution.

use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;

pub type Timestamp = DateTime<Utc>;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// A clock that only moves when told to, plus a fixed step after every read.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<Timestamp>,
    step: Duration,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self::with_step(start, Duration::zero())
    }

    /// Every call to `now` returns the current value and then advances by `step`.
    pub fn with_step(start: Timestamp, step: Duration) -> Self {
        Self {
            current: Mutex::new(start),
            step,
        }
    }

    /// 2023-01-01T00:00:00Z, stepping one second per read.
    pub fn ticking() -> Self {
        let start = Utc.timestamp_opt(1_672_531_200, 0).single().unwrap_or_default();
        Self::with_step(start, Duration::seconds(1))
    }

    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock();
        *current += by;
    }

    pub fn set(&self, to: Timestamp) {
        *self.current.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let mut current = self.current.lock();
        let now = *current;
        *current += self.step;
        now
    }
}
