//! Local wall-clock source.

use chrono::{Days, NaiveDateTime, TimeDelta};
use std::sync::Mutex;
use std::time::Duration;

pub trait Clock: Send + Sync {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Settable clock for tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.lock() = now;
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.lock();
        *now += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NaiveDateTime> {
        self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.lock()
    }
}

/// Time left until the next local midnight. Never zero, so a loop that
/// sleeps on it always makes progress.
pub fn until_next_midnight(now: NaiveDateTime) -> Duration {
    let next = now
        .date()
        .checked_add_days(Days::new(1))
        .and_then(|d| d.and_hms_opt(0, 0, 0));
    match next {
        Some(next) => (next - now)
            .to_std()
            .unwrap_or(Duration::from_secs(1))
            .max(Duration::from_millis(1)),
        None => Duration::from_secs(24 * 60 * 60),
    }
}
