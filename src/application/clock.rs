//! Wall-clock source for post timestamps.

use std::sync::atomic::{AtomicI64, Ordering};

use time::OffsetDateTime;

/// Supplies creation timestamps as nanoseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_nanos(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_nanos(&self) -> i64 {
        let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
        i64::try_from(nanos).unwrap_or(i64::MAX)
    }
}

/// Clock that only moves when told to. Each reading advances it by `step`.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
    step: i64,
}

impl ManualClock {
    pub fn new(start: i64, step: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
            step,
        }
    }

    pub fn set(&self, nanos: i64) {
        self.now.store(nanos, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_nanos(&self) -> i64 {
        self.now.fetch_add(self.step, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_after_2020() {
        const JAN_2020_NANOS: i64 = 1_577_836_800_000_000_000;
        assert!(SystemClock.now_nanos() > JAN_2020_NANOS);
    }

    #[test]
    fn manual_clock_steps_on_each_read() {
        let clock = ManualClock::new(100, 5);
        assert_eq!(clock.now_nanos(), 100);
        assert_eq!(clock.now_nanos(), 105);
        clock.set(1_000);
        assert_eq!(clock.now_nanos(), 1_000);
    }
}
