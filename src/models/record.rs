use super::conflict_state::ConflictState;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub employee_id: String,           // ⇔ records.employee_id
    pub date: NaiveDate,               // ⇔ records.date (TEXT "YYYY-MM-DD")
    pub transaction_id: String,        // ⇔ records.transaction_id (from ingestion)
    pub clock_in: Option<NaiveDateTime>,  // ⇔ records.clock_in (TEXT "YYYY-MM-DD HH:MM")
    pub clock_out: Option<NaiveDateTime>, // ⇔ records.clock_out
    pub total_hours: Option<f64>,      // derived from clock_in/clock_out
    pub conflict: ConflictState,       // ⇔ records.conflict_resolved (NULL/0/1)
    pub period_id: Option<i64>,
    pub is_finalized: bool,
    pub note: String,                  // last edit / resolution reason
    pub resolved_by: Option<String>,
    pub updated_at: Option<String>,
}

impl AttendanceRecord {
    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn clock_in_str(&self) -> String {
        fmt_clock(self.clock_in)
    }

    pub fn clock_out_str(&self) -> String {
        fmt_clock(self.clock_out)
    }

    /// At least one clock value must be present for the record to be usable.
    pub fn is_missing_data(&self) -> bool {
        self.clock_in.is_none() && self.clock_out.is_none()
    }
}

/// Hours between two stamps, rounded to two decimals. `None` unless both
/// stamps are present and in order.
pub fn compute_total_hours(
    clock_in: Option<NaiveDateTime>,
    clock_out: Option<NaiveDateTime>,
) -> Option<f64> {
    match (clock_in, clock_out) {
        (Some(i), Some(o)) if o > i => {
            let minutes = (o - i).num_minutes() as f64;
            Some((minutes / 60.0 * 100.0).round() / 100.0)
        }
        _ => None,
    }
}

fn fmt_clock(ts: Option<NaiveDateTime>) -> String {
    ts.map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}
