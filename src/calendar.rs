//! Date arithmetic for recurring schedules.
//!
//! All arithmetic is on calendar days (`NaiveDate`), so there is no
//! time-of-day component that could drift across repeated steps.

use chrono::{Days, Months, NaiveDate, NaiveDateTime};

use crate::error::{CadenceError, Result};
use crate::models::Frequency;

/// Truncate a timestamp to its calendar day.
pub fn start_of_day(ts: NaiveDateTime) -> NaiveDate {
    ts.date()
}

/// Add calendar months, clamping to the last valid day of the target month
/// (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| CadenceError::Other(format!("date out of range: {date} + {months} months")))
}

fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| CadenceError::Other(format!("date out of range: {date} + {days} days")))
}

/// The occurrence one period after `date`.
pub fn next_occurrence(date: NaiveDate, frequency: Frequency) -> Result<NaiveDate> {
    nth_occurrence(date, frequency, 1)
}

/// The `n`-th occurrence of a schedule anchored at `start` (n = 0 is `start`).
///
/// Monthly schedules are computed from the anchor rather than chained, so a
/// schedule starting on the 31st returns to the 31st in every month that has
/// one: Jan 31, Feb 29, Mar 31, Apr 30.
pub fn nth_occurrence(start: NaiveDate, frequency: Frequency, n: u32) -> Result<NaiveDate> {
    match frequency {
        Frequency::Weekly => add_days(start, 7 * u64::from(n)),
        Frequency::Fortnightly => add_days(start, 14 * u64::from(n)),
        Frequency::Monthly => add_months(start, n),
        Frequency::OneTime => Err(CadenceError::UnsupportedFrequency(frequency.to_string())),
    }
}
