use crate::db::{periods, records};
use crate::errors::{AppError, AppResult};
use crate::models::period::AttendancePeriod;
use crate::models::period_status::PeriodStatus;
use crate::models::record::AttendanceRecord;
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Editability {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl Editability {
    fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn denied(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }

    /// Turn a denial into an `InvalidState` error.
    pub fn ensure(self) -> AppResult<()> {
        if self.allowed {
            Ok(())
        } else {
            Err(AppError::InvalidState(self.reason.unwrap_or_else(|| {
                "Record cannot be edited".to_string()
            })))
        }
    }
}

/// Decide from the record's own flag and its owning period's status.
pub fn can_edit(record: &AttendanceRecord, period: Option<&AttendancePeriod>) -> Editability {
    match period.map(|p| p.status) {
        Some(PeriodStatus::Locked) => {
            Editability::denied("Record is part of a locked payroll period")
        }
        Some(PeriodStatus::Finalized) => {
            Editability::denied("Record is part of a finalized period")
        }
        _ if record.is_finalized => Editability::denied("Record is part of a finalized period"),
        _ => Editability::allowed(),
    }
}

/// Load a record and its period through `conn` and evaluate the guard there.
/// Callers about to write must pass the transaction they will write with.
pub fn check_record(conn: &Connection, record_id: i64) -> AppResult<(AttendanceRecord, Editability)> {
    let record =
        records::load_record(conn, record_id)?.ok_or_else(|| AppError::not_found_record(record_id))?;

    let period = match record.period_id {
        Some(pid) => periods::load_period(conn, pid)?,
        None => None,
    };

    let verdict = can_edit(&record, period.as_ref());
    Ok((record, verdict))
}
