//! Wall-clock abstraction
//!
//! Daily rotation, retention cutoffs and record timestamps all read the
//! current time through a [`Clock`], so tests can move the calendar day
//! without waiting for midnight.

use chrono::{DateTime, Duration, Local};
use parking_lot::Mutex;
use std::fmt;

/// Source of the current local time
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Local>;

    /// Calendar day used in log file names (`YYYY-MM-DD`)
    fn today(&self) -> String {
        day_string(&self.now())
    }
}

/// Format a timestamp as the day component of a log file name
pub fn day_string(datetime: &DateTime<Local>) -> String {
    datetime.format("%Y-%m-%d").to_string()
}

/// The operating system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to
///
/// # Example
///
/// ```
/// use dual_stream_logger::core::{Clock, ManualClock};
/// use chrono::Duration;
///
/// let clock = ManualClock::starting_now();
/// let before = clock.today();
/// clock.advance(Duration::days(1));
/// assert_ne!(before, clock.today());
/// ```
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<Local>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    pub fn starting_now() -> Self {
        Self::new(Local::now())
    }

    pub fn set(&self, datetime: DateTime<Local>) {
        *self.current.lock() = datetime;
    }

    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock();
        *current += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.current.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_day_string() {
        let datetime = Local
            .with_ymd_and_hms(2024, 1, 10, 23, 59, 59)
            .single()
            .expect("valid datetime");
        assert_eq!(day_string(&datetime), "2024-01-10");
    }

    #[test]
    fn test_manual_clock_advances_across_midnight() {
        let start = Local
            .with_ymd_and_hms(2024, 1, 10, 23, 59, 0)
            .single()
            .expect("valid datetime");
        let clock = ManualClock::new(start);
        assert_eq!(clock.today(), "2024-01-10");

        clock.advance(Duration::minutes(2));
        assert_eq!(clock.today(), "2024-01-11");
    }
}
