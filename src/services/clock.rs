//! Current-time sources for the lot

use crate::domain::error::{ParkingError, Result};
use chrono::{Local, NaiveDateTime, TimeDelta};
use std::cell::Cell;
use std::rc::Rc;

pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in local time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Hand-driven clock for tests and scripted simulations
///
/// Clones share the same instant, so a handle kept by the caller can advance
/// the clock owned by a lot.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<NaiveDateTime>>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self { now: Rc::new(Cell::new(start)) }
    }

    pub fn set(&self, at: NaiveDateTime) {
        self.now.set(at);
    }

    /// Move the clock by `minutes` (negative moves it back) and return the new instant.
    ///
    /// A shift past chrono's date range leaves the clock untouched.
    pub fn advance_minutes(&self, minutes: i64) -> Result<NaiveDateTime> {
        let next = TimeDelta::try_minutes(minutes)
            .and_then(|delta| self.now.get().checked_add_signed(delta))
            .ok_or(ParkingError::ClockOverflow { minutes })?;
        self.now.set(next);
        Ok(next)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let start = NaiveDate::from_ymd_opt(2022, 5, 15).unwrap().and_hms_opt(13, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        let handle = clock.clone();

        let advanced = handle.advance_minutes(144).unwrap();
        assert_eq!(advanced, start + TimeDelta::minutes(144));
        assert_eq!(clock.now(), advanced);

        handle.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn test_manual_clock_rejects_out_of_range_shift() {
        let start = NaiveDate::from_ymd_opt(2022, 5, 15).unwrap().and_hms_opt(13, 0, 0).unwrap();
        let clock = ManualClock::new(start);

        for minutes in [1_000_000_000_000, i64::MIN, i64::MAX] {
            assert_eq!(
                clock.advance_minutes(minutes),
                Err(ParkingError::ClockOverflow { minutes })
            );
        }
        assert_eq!(clock.now(), start);
    }
}
