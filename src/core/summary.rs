use crate::db::periods::find_overlapping;
use crate::db::records::{RecordScope, record_stats};
use crate::errors::{AppError, AppResult};
use crate::models::period::AttendancePeriod;
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub total_records: i64,
    pub employee_count: i64,
    pub pending_approvals: i64,
    pub conflicts: i64,
    pub missing_data: i64,
    pub period: AttendancePeriod,
}

/// Counts for the decision screen. `period` is the stored period covering any
/// day of the range, with its real status, even when the range is only a
/// slice of it. A transient PENDING projection (id = None) is returned only
/// when no stored period touches the range; nothing is written.
pub fn summarize(conn: &Connection, start: NaiveDate, end: NaiveDate) -> AppResult<PeriodSummary> {
    if start > end {
        return Err(AppError::InvalidRange(format!(
            "start {} is after end {}",
            start, end
        )));
    }

    let stats = record_stats(conn, RecordScope::Range(start, end))?;
    let period = find_overlapping(conn, &start, &end)?
        .unwrap_or_else(|| AttendancePeriod::projection(start, end));

    Ok(PeriodSummary {
        total_records: stats.total_records,
        employee_count: stats.employee_count,
        pending_approvals: stats.issues.pending_approvals,
        conflicts: stats.issues.unresolved_conflicts,
        missing_data: stats.issues.missing_data,
        period,
    })
}
