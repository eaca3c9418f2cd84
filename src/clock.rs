//! Time source used to stamp note timestamps and file names.

use std::{fmt::Debug, sync::Mutex};

use chrono::{Duration, Local, NaiveDateTime, Utc};

/// Supplies the current time to notes and the repository.
pub trait Clock: Debug + Send + Sync {
    /// Current local wall-clock time, without zone information.
    fn now(&self) -> NaiveDateTime;

    /// Milliseconds since the Unix epoch, used for file name stamps.
    fn epoch_millis(&self) -> i64;
}

/// Reads the real system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn epoch_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    pub fn set(&self, time: NaiveDateTime) {
        if let Ok(mut current) = self.current.lock() {
            *current = time;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut current) = self.current.lock() {
            *current += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        match self.current.lock() {
            Ok(current) => *current,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn epoch_millis(&self) -> i64 {
        self.now().and_utc().timestamp_millis()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn manual_clock_advances() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let clock = ManualClock::new(start);

        assert_eq!(clock.now(), start);
        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now(), start + Duration::seconds(90));
        assert_eq!(
            clock.epoch_millis(),
            (start + Duration::seconds(90)).and_utc().timestamp_millis()
        );
    }
}
