//! Clock-time parsing and shift-length helpers.

use crate::errors::{AppError, AppResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Strict 24-hour `HH:MM`.
pub fn parse_time(t: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(t.trim(), "%H:%M").ok()
}

pub fn shift_minutes(clock_in: NaiveDateTime, clock_out: NaiveDateTime) -> i64 {
    clock_out.signed_duration_since(clock_in).num_minutes()
}

/// `525` → `8h45m`. Negative spans keep their sign.
pub fn format_shift(mins: i64) -> String {
    let sign = if mins < 0 { "-" } else { "" };
    let m = mins.unsigned_abs();
    format!("{}{}h{:02}m", sign, m / 60, m % 60)
}

/// Anchor an optional `HH:MM` on `date`.
pub fn parse_optional_stamp(
    date: NaiveDate,
    input: Option<&String>,
) -> AppResult<Option<NaiveDateTime>> {
    input
        .map(|s| {
            parse_time(s)
                .map(|t| date.and_time(t))
                .ok_or_else(|| AppError::InvalidTime(s.to_string()))
        })
        .transpose()
}
