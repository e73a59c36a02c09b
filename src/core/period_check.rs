use crate::db::records::{RecordScope, record_stats};
use crate::errors::{AppError, AppResult};
use crate::models::issue::{IssueCounts, PeriodIssue};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

/// Answer to "can this range be finalized?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodValidation {
    pub can_finalize: bool,
    pub issues: Vec<PeriodIssue>,
}

impl PeriodValidation {
    pub fn from_counts(counts: IssueCounts) -> Self {
        Self {
            can_finalize: counts.is_clear(),
            issues: counts.to_issues(),
        }
    }
}

/// Read-only check over every record dated inside `start..=end`.
pub fn validate_period(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<PeriodValidation> {
    if start > end {
        return Err(AppError::InvalidRange(format!(
            "start {} is after end {}",
            start, end
        )));
    }

    let stats = record_stats(conn, RecordScope::Range(start, end))?;
    Ok(PeriodValidation::from_counts(stats.issues))
}
