//! Per-level rate limiting
//!
//! Each limited level owns a counter and the instant its window last
//! reset. The window rolls forward lazily: the first evaluation after
//! `period` has elapsed zeroes the counter before counting itself, so a
//! quiet stretch longer than the window is absorbed on the next call.

use crate::core::LogLevel;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Maximum number of records admitted per period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub max_count: u64,
    pub period: Duration,
}

impl RateLimit {
    pub fn new(max_count: u64, period: Duration) -> Self {
        Self { max_count, period }
    }
}

#[derive(Debug)]
struct RateWindow {
    counter: u64,
    last_reset: Option<Instant>,
}

#[derive(Debug)]
struct LevelLimiter {
    limit: RateLimit,
    // Reset and increment happen under one lock so two callers can never
    // both observe an expired window and both pass.
    window: Mutex<RateWindow>,
}

/// Mutable rate-limit state for one logger instance
#[derive(Debug, Default)]
pub struct RateLimiter {
    limits: HashMap<LogLevel, LevelLimiter>,
}

impl RateLimiter {
    pub fn new(limits: &HashMap<LogLevel, RateLimit>) -> Self {
        let limits = limits
            .iter()
            .map(|(level, limit)| {
                (
                    *level,
                    LevelLimiter {
                        limit: *limit,
                        window: Mutex::new(RateWindow {
                            counter: 0,
                            last_reset: None,
                        }),
                    },
                )
            })
            .collect();
        Self { limits }
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }

    /// Count one record at `level` and report whether it is admitted
    pub fn check(&self, level: LogLevel) -> bool {
        self.check_at(level, Instant::now())
    }

    /// Same as [`check`](Self::check) with an explicit evaluation instant
    pub fn check_at(&self, level: LogLevel, now: Instant) -> bool {
        let Some(limiter) = self.limits.get(&level) else {
            return true;
        };

        let mut window = limiter.window.lock();
        let expired = match window.last_reset {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= limiter.limit.period,
        };
        if expired {
            window.counter = 0;
            window.last_reset = Some(now);
        }

        window.counter = window.counter.saturating_add(1);
        window.counter <= limiter.limit.max_count
    }

    /// Records counted in the current window, `None` for unlimited levels
    pub fn current_count(&self, level: LogLevel) -> Option<u64> {
        self.limits
            .get(&level)
            .map(|limiter| limiter.window.lock().counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::thread;

    fn limiter(level: LogLevel, max: u64, period: Duration) -> RateLimiter {
        let mut limits = HashMap::new();
        limits.insert(level, RateLimit::new(max, period));
        RateLimiter::new(&limits)
    }

    #[test]
    fn test_admits_up_to_max_within_window() {
        let limiter = limiter(LogLevel::Info, 3, Duration::from_secs(60));
        let start = Instant::now();

        let admitted = (0..5)
            .filter(|i| limiter.check_at(LogLevel::Info, start + Duration::from_millis(*i)))
            .count();
        assert_eq!(admitted, 3);
        assert_eq!(limiter.current_count(LogLevel::Info), Some(5));
    }

    #[test]
    fn test_window_resets_after_period() {
        let limiter = limiter(LogLevel::Info, 3, Duration::from_secs(60));
        let start = Instant::now();

        for _ in 0..5 {
            limiter.check_at(LogLevel::Info, start);
        }
        assert!(!limiter.check_at(LogLevel::Info, start + Duration::from_secs(59)));

        // Exactly one period later counts as elapsed
        assert!(limiter.check_at(LogLevel::Info, start + Duration::from_secs(60)));
        assert_eq!(limiter.current_count(LogLevel::Info), Some(1));
    }

    #[test]
    fn test_unlimited_levels_always_pass() {
        let limiter = limiter(LogLevel::Debug, 0, Duration::from_secs(60));
        for _ in 0..100 {
            assert!(limiter.check(LogLevel::Error));
        }
        assert!(!limiter.check(LogLevel::Debug));
        assert_eq!(limiter.current_count(LogLevel::Error), None);
    }

    #[test]
    fn test_concurrent_callers_share_one_window() {
        let limiter = Arc::new(limiter(LogLevel::Warn, 50, Duration::from_secs(3600)));
        let admitted = Arc::new(AtomicU64::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let admitted = Arc::clone(&admitted);
                thread::spawn(move || {
                    for _ in 0..100 {
                        if limiter.check(LogLevel::Warn) {
                            admitted.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(admitted.load(Ordering::Relaxed), 50);
    }
}
