//! Week-year calendar arithmetic.
//!
//! Weeks start on Sunday and week 1 is the week that contains January 1,
//! so week 1 may begin in the previous December.

use chrono::{Datelike, Duration, NaiveDate};

/// First valid week number.
pub const FIRST_WEEK: i64 = 1;

/// Last valid week number.
pub const LAST_WEEK: i64 = 53;

/// Calendar date of the Sunday that starts `week` of `year`.
///
/// Returns `None` when the week is outside `[1, 53]` or the year cannot be
/// represented.
pub fn week_start_date(year: i64, week: i64) -> Option<NaiveDate> {
    if !(FIRST_WEEK..=LAST_WEEK).contains(&week) {
        return None;
    }
    let year = i32::try_from(year).ok()?;
    let jan_first = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let offset = i64::from(jan_first.weekday().num_days_from_sunday());
    let first_sunday = jan_first.checked_sub_signed(Duration::days(offset))?;
    first_sunday.checked_add_signed(Duration::weeks(week - 1))
}

/// Days since 1970-01-01, the representation of a SQL `DATE` column.
pub fn days_since_epoch(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    // chrono dates span well inside i32 days.
    date.signed_duration_since(epoch).num_days() as i32
}

/// Inverse of [`days_since_epoch`].
pub fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(Duration::days(i64::from(days)))
}
