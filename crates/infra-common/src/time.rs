//! Injectable time source
//!
//! Both the mailbox relay (idle eviction) and the call controller (duration
//! tracking, transcript timestamps) need wall-clock time. Taking the clock
//! as a trait object instead of calling `Utc::now()` directly lets tests
//! drive eviction and duration logic with a simulated clock.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

/// A source of wall-clock time
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// The current instant
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Arc<Self> {
        Arc::new(SystemClock)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A manually advanced clock for tests
///
/// Starts at the instant it was created (or a provided instant) and only
/// moves when `advance` or `set` is called.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Create a clock frozen at the current system time
    pub fn new() -> Arc<Self> {
        Self::starting_at(Utc::now())
    }

    /// Create a clock frozen at a specific instant
    pub fn starting_at(start: DateTime<Utc>) -> Arc<Self> {
        Arc::new(ManualClock {
            now: Arc::new(Mutex::new(start)),
        })
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now = *now + by;
    }

    /// Jump the clock to a specific instant
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_is_frozen_until_advanced() {
        let clock = ManualClock::new();
        let first = clock.now();
        assert_eq!(clock.now(), first);

        clock.advance(Duration::seconds(301));
        assert_eq!(clock.now() - first, Duration::seconds(301));
    }

    #[test]
    fn manual_clock_set_jumps() {
        let clock = ManualClock::new();
        let target = clock.now() + Duration::minutes(10);
        clock.set(target);
        assert_eq!(clock.now(), target);
    }

    #[test]
    fn system_clock_advances() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
