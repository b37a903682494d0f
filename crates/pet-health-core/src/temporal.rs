//! Date parsing and day arithmetic shared by the tracker, reminders and analytics.
//!
//! Stored dates arrive in mixed shapes: full ISO-8601 timestamps from the
//! server, bare `YYYY-MM-DD` values from date pickers, and occasionally
//! `YYYY/MM/DD` from imports. Everything funnels through
//! [`parse_flexible_date`], which never fails loudly: an unusable value is
//! simply "no date" and callers leave it out of temporal logic.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Milliseconds in one calendar day.
const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Bare dates are anchored at local noon so that a timezone shift of a few
/// hours in either direction still lands on the same calendar day.
const BARE_DATE_ANCHOR_HOUR: u32 = 12;

/// A raw date value as handed over by the store or a caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DateValue<'a> {
    /// An already-resolved local instant.
    Instant(DateTime<Local>),
    /// Text in any of the accepted shapes.
    Text(&'a str),
}

impl<'a> From<&'a str> for DateValue<'a> {
    fn from(value: &'a str) -> Self {
        DateValue::Text(value)
    }
}

impl<'a> From<&'a String> for DateValue<'a> {
    fn from(value: &'a String) -> Self {
        DateValue::Text(value.as_str())
    }
}

impl From<DateTime<Local>> for DateValue<'_> {
    fn from(value: DateTime<Local>) -> Self {
        DateValue::Instant(value)
    }
}

/// Parse a date value into a local instant.
///
/// - An instant is returned as-is.
/// - Text containing `T` is read as an ISO-8601 date-time. With an offset it is
///   converted to local time; without one it is taken as local wall-clock time.
/// - `YYYY-MM-DD` or `YYYY/MM/DD` is anchored at local noon.
///
/// Returns `None` for anything else, including impossible calendar dates.
pub fn parse_flexible_date<'a>(value: impl Into<DateValue<'a>>) -> Option<DateTime<Local>> {
    match value.into() {
        DateValue::Instant(instant) => Some(instant),
        DateValue::Text(text) => parse_text(text.trim()),
    }
}

fn parse_text(text: &str) -> Option<DateTime<Local>> {
    if text.is_empty() {
        return None;
    }
    if text.contains('T') {
        return parse_date_time(text);
    }
    parse_bare_date(text).and_then(local_noon)
}

fn parse_date_time(text: &str) -> Option<DateTime<Local>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Local));
    }

    let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M"))
        .ok()?;
    Local.from_local_datetime(&naive).earliest()
}

/// Parse a bare `YYYY-MM-DD` or `YYYY/MM/DD` calendar date.
pub fn parse_bare_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.trim().split(['-', '/']);
    let year = parts.next()?.trim().parse::<i32>().ok()?;
    let month = parts.next()?.trim().parse::<u32>().ok()?;
    let day = parts.next()?.trim().parse::<u32>().ok()?;
    if parts.next().is_some() || year == 0 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Local noon on the given calendar date.
pub fn local_noon(date: NaiveDate) -> Option<DateTime<Local>> {
    let naive = date.and_hms_opt(BARE_DATE_ANCHOR_HOUR, 0, 0)?;
    Local.from_local_datetime(&naive).earliest()
}

/// Local midnight at the start of `now`'s calendar day, as wall-clock time.
pub fn start_of_day(now: DateTime<Local>) -> NaiveDateTime {
    now.date_naive().and_time(NaiveTime::MIN)
}

/// Whole days from the start of `now`'s day to `instant`, rounded down.
///
/// Today is 0, tomorrow 1, yesterday -1. Computed on local wall-clock time so
/// daylight-saving transitions do not shave an hour off a day.
pub fn day_offset(instant: DateTime<Local>, now: DateTime<Local>) -> i64 {
    let elapsed = instant.naive_local() - start_of_day(now);
    elapsed.num_milliseconds().div_euclid(MS_PER_DAY)
}

/// `YYYY-MM` key of a local instant.
pub fn month_key(instant: DateTime<Local>) -> String {
    format!("{:04}-{:02}", instant.year(), instant.month())
}

/// `YYYY` key of a local instant.
pub fn year_key(instant: DateTime<Local>) -> String {
    format!("{:04}", instant.year())
}
