//! Field-level validation of a single attendance record edit.
//!
//! Every rule runs on every call and all violations are returned together, so
//! a form can show each problem at once. No I/O, safe on every keystroke.

use crate::errors::{AppError, AppResult, EditField, FieldViolation};
use crate::models::record::AttendanceRecord;
use crate::utils::date::parse_date;
use crate::utils::time::{format_shift, parse_time, shift_minutes};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Bounds on a single clock-in → clock-out span, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftLimits {
    pub min_minutes: i64,
    pub max_minutes: i64,
}

impl Default for ShiftLimits {
    fn default() -> Self {
        Self {
            min_minutes: 15,
            max_minutes: 24 * 60,
        }
    }
}

/// Raw form input for an edit. Times are `HH:MM` strings as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordEdit {
    pub date: String,
    pub clock_in: Option<String>,
    pub clock_out: Option<String>,
    pub reason: String,
}

/// Edit input after every rule passed, with times anchored on the date.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEdit {
    pub date: NaiveDate,
    pub clock_in: Option<NaiveDateTime>,
    pub clock_out: Option<NaiveDateTime>,
    pub reason: String,
}

fn supplied(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Span rules shared by edit validation and any caller holding full stamps.
pub fn check_span(
    start: NaiveDateTime,
    end: NaiveDateTime,
    limits: &ShiftLimits,
) -> Vec<FieldViolation> {
    let mut out = Vec::new();

    if end <= start {
        out.push(FieldViolation::new(
            EditField::ClockOut,
            "Clock-out must be after clock-in",
        ));
        return out;
    }

    let mins = shift_minutes(start, end);
    if mins < limits.min_minutes {
        out.push(FieldViolation::new(
            EditField::ClockOut,
            format!(
                "Shift must last at least {} minutes (got {})",
                limits.min_minutes,
                format_shift(mins)
            ),
        ));
    }
    if mins > limits.max_minutes {
        out.push(FieldViolation::new(
            EditField::ClockOut,
            format!(
                "Shift cannot exceed {} hours (got {})",
                limits.max_minutes / 60,
                format_shift(mins)
            ),
        ));
    }

    out
}

pub struct EditValidator {
    today: NaiveDate,
    limits: ShiftLimits,
}

impl EditValidator {
    pub fn new(today: NaiveDate, limits: ShiftLimits) -> Self {
        Self { today, limits }
    }

    pub fn limits(&self) -> ShiftLimits {
        self.limits
    }

    /// All violations for `edit` against `original`; empty means acceptable.
    pub fn validate(&self, edit: &RecordEdit, original: &AttendanceRecord) -> Vec<FieldViolation> {
        self.run(edit, original).0
    }

    /// Same rules, returning the parsed edit or a `Validation` error.
    pub fn check(&self, edit: &RecordEdit, original: &AttendanceRecord) -> AppResult<ValidatedEdit> {
        match self.run(edit, original) {
            (violations, Some(ok)) if violations.is_empty() => Ok(ok),
            (violations, _) => Err(AppError::Validation(violations)),
        }
    }

    fn run(
        &self,
        edit: &RecordEdit,
        original: &AttendanceRecord,
    ) -> (Vec<FieldViolation>, Option<ValidatedEdit>) {
        let mut v = Vec::new();

        // Date
        let date = match edit.date.trim() {
            "" => {
                v.push(FieldViolation::new(EditField::Date, "Date is required"));
                None
            }
            raw => match parse_date(raw) {
                Some(d) if d > self.today => {
                    v.push(FieldViolation::new(
                        EditField::Date,
                        "Date cannot be in the future",
                    ));
                    Some(d)
                }
                Some(d) => Some(d),
                None => {
                    v.push(FieldViolation::new(
                        EditField::Date,
                        format!("Invalid date '{}', expected YYYY-MM-DD", raw),
                    ));
                    None
                }
            },
        };

        // Times
        let in_raw = supplied(&edit.clock_in);
        let out_raw = supplied(&edit.clock_out);

        let clock_in = parse_field(in_raw, EditField::ClockIn, "Clock-in", &mut v);
        let clock_out = parse_field(out_raw, EditField::ClockOut, "Clock-out", &mut v);

        // Span (only when both parse; anchored on the proposed or original date)
        if let (Some(i), Some(o)) = (clock_in, clock_out) {
            let anchor = date.unwrap_or(original.date);
            v.extend(check_span(anchor.and_time(i), anchor.and_time(o), &self.limits));
        }

        if in_raw.is_none() && out_raw.is_none() {
            v.push(FieldViolation::new(
                EditField::ClockIn,
                "At least one of clock-in or clock-out is required",
            ));
        }

        // Reason, mandatory once anything changed
        let date_changed = date.map(|d| d != original.date).unwrap_or(true);
        let in_changed = field_changed(in_raw, clock_in, original.clock_in);
        let out_changed = field_changed(out_raw, clock_out, original.clock_out);

        let reason = edit.reason.trim();
        if (date_changed || in_changed || out_changed) && reason.is_empty() {
            v.push(FieldViolation::new(
                EditField::Reason,
                "A reason is required when changing the date or clock times",
            ));
        }

        let validated = date.map(|d| ValidatedEdit {
            date: d,
            clock_in: clock_in.map(|t| d.and_time(t)),
            clock_out: clock_out.map(|t| d.and_time(t)),
            reason: reason.to_string(),
        });

        (v, validated)
    }
}

fn parse_field(
    raw: Option<&str>,
    field: EditField,
    label: &str,
    out: &mut Vec<FieldViolation>,
) -> Option<NaiveTime> {
    let raw = raw?;
    match parse_time(raw) {
        Some(t) => Some(t),
        None => {
            out.push(FieldViolation::new(
                field,
                format!("{} '{}' is not a valid 24-hour time (HH:MM)", label, raw),
            ));
            None
        }
    }
}

/// Compared on time of day: the form only carries `HH:MM`.
fn field_changed(
    raw: Option<&str>,
    parsed: Option<NaiveTime>,
    original: Option<NaiveDateTime>,
) -> bool {
    match (raw, parsed) {
        (None, _) => original.is_some(),
        (Some(_), None) => true,
        (Some(_), Some(t)) => original.map(|o| o.time()) != Some(t),
    }
}
