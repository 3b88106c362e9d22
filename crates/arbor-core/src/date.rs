//! Calendar-day arithmetic shared by the recurrence engine and the filters.
//!
//! Every date handled by the engine is a [`NaiveDate`]: a calendar day with no
//! time-of-day and no timezone. Serialized, it is the sortable `YYYY-MM-DD` form.

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Wire format of a calendar day.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar-day string.
pub fn parse_day(input: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(input.trim(), DAY_FORMAT)
        .map_err(|_| CoreError::InvalidDate(input.to_string()))
}

/// Format a calendar day in the wire format.
pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Signed number of whole days from `from` to `to`.
#[inline]
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// The Monday starting the week that contains `day`.
#[inline]
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

/// Signed number of calendar weeks (Monday boundary) from `from` to `to`.
///
/// Two days in the same Monday-to-Sunday week are zero weeks apart, a Sunday
/// and the following Monday are one week apart.
#[inline]
pub fn weeks_between(from: NaiveDate, to: NaiveDate) -> i64 {
    days_between(week_start(from), week_start(to)) / 7
}

/// Signed number of calendar months from `from` to `to`, ignoring day-of-month.
#[inline]
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    i64::from(to.year() - from.year()) * 12 + i64::from(to.month()) - i64::from(from.month())
}

/// Weekday ordinal with Sunday = 0, the numbering used by `daysOfWeek`.
#[inline]
pub fn weekday_ordinal(day: NaiveDate) -> u8 {
    day.weekday().num_days_from_sunday() as u8
}

pub fn add_days(day: NaiveDate, days: i64) -> Option<NaiveDate> {
    day.checked_add_signed(Duration::days(days))
}

/// Add whole months, clamping to the last day of a shorter target month
/// (`2024-01-31 + 1 month = 2024-02-29`).
pub fn add_months(day: NaiveDate, months: u32) -> Option<NaiveDate> {
    day.checked_add_months(Months::new(months))
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Where a selected date sits relative to the reference "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateView {
    Past,
    Today,
    Future,
}

impl DateView {
    pub fn classify(date: NaiveDate, today: NaiveDate) -> Self {
        match date.cmp(&today) {
            std::cmp::Ordering::Less => DateView::Past,
            std::cmp::Ordering::Equal => DateView::Today,
            std::cmp::Ordering::Greater => DateView::Future,
        }
    }
}

impl std::fmt::Display for DateView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateView::Past => write!(f, "past"),
            DateView::Today => write!(f, "today"),
            DateView::Future => write!(f, "future"),
        }
    }
}
