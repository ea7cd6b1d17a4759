//! Month keys and local calendar dates.
//!
//! A month key is the `MMYYYY` token transactions are partitioned by, e.g. `102026` for October
//! 2026. All conversions from an instant use the local time zone, because the date a user sees on
//! a form must be the calendar day they picked.

use crate::Result;
use anyhow::{bail, Context};
use chrono::{DateTime, Datelike, Local, NaiveDate};
use tracing::debug;

/// Builds the `MMYYYY` key for the month containing `date`.
pub fn month_key(date: NaiveDate) -> String {
    format!("{}{}", two_digits(date.month()), date.year())
}

/// The month key for today on the local clock.
pub fn current_month_key() -> String {
    month_key(Local::now().date_naive())
}

/// The upper-case English name of the current local month, e.g. `OCTOBER`.
pub fn current_month_name() -> String {
    month_name(Local::now().date_naive())
}

/// The upper-case English name of `date`'s month.
pub fn month_name(date: NaiveDate) -> String {
    date.format("%B").to_string().to_uppercase()
}

/// Parses an `MMYYYY` key into the first day of that month.
pub fn parse_month_key(key: &str) -> Result<NaiveDate> {
    if key.len() != 6 || !key.chars().all(|c| c.is_ascii_digit()) {
        bail!("A month key must be six digits in the form MMYYYY, got '{key}'");
    }
    let month: u32 = key[..2].parse().context("Invalid month in month key")?;
    let year: i32 = key[2..].parse().context("Invalid year in month key")?;
    NaiveDate::from_ymd_opt(year, month, 1)
        .with_context(|| format!("The month key '{key}' does not name a calendar month"))
}

/// Converts an instant into the local calendar date it falls on.
pub fn local_date(millis: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(millis).map(|utc| utc.with_timezone(&Local).date_naive())
}

/// Renders the local calendar date of `millis` as `DD/MM/YYYY`. Out of range instants render as
/// an empty string.
pub fn format_ddmmyyyy(millis: i64) -> String {
    match local_date(millis) {
        Some(date) => format!(
            "{}/{}/{}",
            two_digits(date.day()),
            two_digits(date.month()),
            date.year()
        ),
        None => {
            debug!("Instant {millis} is out of range for a calendar date");
            String::new()
        }
    }
}

/// The month key for the local month `millis` falls in.
pub fn month_key_from_millis(millis: i64) -> String {
    local_date(millis).map(month_key).unwrap_or_default()
}

/// Milliseconds since the epoch for local midnight at the start of `date`.
pub fn local_midnight_millis(date: NaiveDate) -> Option<i64> {
    date.and_hms_opt(0, 0, 0)?
        .and_local_timezone(Local)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

/// Milliseconds since the epoch for local noon on `date`. Noon never falls in a DST gap, so a
/// date picked this way always maps back to the same calendar day.
pub fn local_noon_millis(date: NaiveDate) -> Option<i64> {
    date.and_hms_opt(12, 0, 0)?
        .and_local_timezone(Local)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

/// Left-pads a calendar number to two digits, e.g. `7` -> `07`.
fn two_digits(n: u32) -> String {
    format!("{n:02}")
}
