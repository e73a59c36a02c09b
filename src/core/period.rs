//! Period creation and lookups.

use crate::core::{require_actor, trace_failure};
use crate::db::pool::DbPool;
use crate::db::records::{self, RecordScope};
use crate::db::{audit, periods};
use crate::errors::{AppError, AppResult};
use crate::models::audit::AuditAction;
use crate::models::period::AttendancePeriod;
use crate::models::record::AttendanceRecord;
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, Transaction};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedPeriod {
    pub period: AttendancePeriod,
    /// Unassigned records picked up by the new period.
    pub associated_records: usize,
}

/// Create a PENDING period over `start..=end` and attach every unassigned
/// record dated inside it. Overlapping an existing period is rejected.
pub fn create_period(
    pool: &mut DbPool,
    start: NaiveDate,
    end: NaiveDate,
    actor: &str,
) -> AppResult<CreatedPeriod> {
    let result = require_actor(actor).and_then(|actor| {
        if start > end {
            return Err(AppError::InvalidRange(format!(
                "start {} is after end {}",
                start, end
            )));
        }

        let tx = pool.write_tx()?;
        let created = create_in_tx(&tx, start, end, actor)?;
        tx.commit()?;
        Ok(created)
    });

    match &result {
        Ok(c) => tracing::info!(
            period_id = c.period.id,
            actor,
            associated = c.associated_records,
            "period created"
        ),
        Err(e) => trace_failure("create_period", 0, actor, e),
    }
    result
}

fn create_in_tx(
    tx: &Transaction,
    start: NaiveDate,
    end: NaiveDate,
    actor: &str,
) -> AppResult<CreatedPeriod> {
    if let Some(existing) = periods::find_overlapping(tx, &start, &end)? {
        return Err(AppError::Overlap {
            start: start.to_string(),
            end: end.to_string(),
            existing: existing.id.unwrap_or_default(),
        });
    }

    let now = Local::now().to_rfc3339();
    let id = periods::insert_period(tx, &start, &end, actor, &now)?;
    let associated = records::associate_unassigned(tx, &start, &end, id)?;

    audit::append(
        tx,
        actor,
        AuditAction::CreatePeriod,
        id,
        "",
        &json!({
            "start_date": start.to_string(),
            "end_date": end.to_string(),
            "status": "PENDING",
            "associated_records": associated,
        })
        .to_string(),
    )?;

    let period = periods::load_period(tx, id)?.ok_or_else(|| AppError::not_found_period(id))?;

    Ok(CreatedPeriod {
        period,
        associated_records: associated,
    })
}

pub fn get_period(conn: &Connection, period_id: i64) -> AppResult<AttendancePeriod> {
    periods::load_period(conn, period_id)?.ok_or_else(|| AppError::not_found_period(period_id))
}

/// Records attached to the period, ordered by date then employee.
pub fn records_for_period(conn: &Connection, period_id: i64) -> AppResult<Vec<AttendanceRecord>> {
    get_period(conn, period_id)?;
    records::load_records(conn, RecordScope::Period(period_id))
}
