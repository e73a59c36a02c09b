//! Entry point for raw time-clock rows handed over by the ingestion layer.

use crate::core::{require_actor, trace_failure};
use crate::db::pool::DbPool;
use crate::db::audit;
use crate::db::records::{self, NewRecord};
use crate::errors::{AppError, AppResult};
use crate::models::audit::AuditAction;
use crate::models::record::AttendanceRecord;
use rusqlite::ErrorCode;
use serde_json::json;

fn is_unique_violation(err: &AppError) -> bool {
    matches!(
        err,
        AppError::Db(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation
    )
}

/// Store one ingested row. The record starts unassigned: periods pick it up
/// when they are created.
pub fn ingest_record(pool: &mut DbPool, rec: &NewRecord, actor: &str) -> AppResult<AttendanceRecord> {
    let result = require_actor(actor).and_then(|actor| {
        if rec.employee_id.trim().is_empty() || rec.transaction_id.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "employee id and transaction id are required".to_string(),
            ));
        }
        if rec.clock_in.is_none() && rec.clock_out.is_none() {
            return Err(AppError::InvalidInput(
                "at least one of clock-in or clock-out is required".to_string(),
            ));
        }

        let tx = pool.write_tx()?;

        let id = records::insert_record(&tx, rec).map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Duplicate(format!(
                    "{} on {} (transaction {})",
                    rec.employee_id, rec.date, rec.transaction_id
                ))
            } else {
                e
            }
        })?;

        let stored = records::load_record(&tx, id)?.ok_or_else(|| AppError::not_found_record(id))?;

        audit::append(
            &tx,
            actor,
            AuditAction::Ingest,
            id,
            "",
            &json!({
                "employee_id": stored.employee_id,
                "date": stored.date_str(),
                "transaction_id": stored.transaction_id,
                "clock_in": records::ts_to_db(&stored.clock_in),
                "clock_out": records::ts_to_db(&stored.clock_out),
                "conflict": stored.conflict.label(),
            })
            .to_string(),
        )?;

        tx.commit()?;
        Ok(stored)
    });

    match &result {
        Ok(r) => tracing::info!(record_id = r.id, employee = %r.employee_id, "record ingested"),
        Err(e) => trace_failure("ingest", 0, actor, e),
    }
    result
}
