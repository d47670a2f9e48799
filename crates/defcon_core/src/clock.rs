//! Wall-clock access for task creation and the daily deadline.

use crate::view::deadline::start_of_day_ms;
use chrono::{Local, TimeZone};

/// Source of "now" and of the current day's local midnight.
pub trait Clock {
    /// Current time in Unix epoch milliseconds.
    fn now_ms(&self) -> i64;
    /// Local midnight of the current day in Unix epoch milliseconds.
    fn start_of_today_ms(&self) -> i64;
}

/// System clock in the machine's local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Local::now().timestamp_millis()
    }

    fn start_of_today_ms(&self) -> i64 {
        start_of_day_ms(&Local::now())
    }
}

/// Clock pinned to one instant, evaluated in the local time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    now_ms: i64,
}

impl FixedClock {
    pub fn at(now_ms: i64) -> Self {
        Self { now_ms }
    }

    pub fn set(&mut self, now_ms: i64) {
        self.now_ms = now_ms;
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.now_ms
    }

    fn start_of_today_ms(&self) -> i64 {
        match Local.timestamp_millis_opt(self.now_ms).single() {
            Some(now) => start_of_day_ms(&now),
            None => self.now_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock, SystemClock};

    #[test]
    fn fixed_clock_midnight_is_not_after_now() {
        let clock = FixedClock::at(1_760_000_000_000);
        let start = clock.start_of_today_ms();
        assert!(start <= clock.now_ms());
        assert!(clock.now_ms() - start < 26 * 3600 * 1000);
    }

    #[test]
    fn system_clock_midnight_is_not_after_now() {
        let clock = SystemClock;
        let start = clock.start_of_today_ms();
        assert!(start <= clock.now_ms());
    }
}
