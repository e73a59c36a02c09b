//! Server-side record mutations: time edits and conflict decisions.
//! Both re-run the editability guard inside their write transaction.

use crate::client::RecordEditor;
use crate::core::guard::check_record;
use crate::core::validator::{EditValidator, RecordEdit};
use crate::core::{require_actor, trace_failure};
use crate::db::pool::DbPool;
use crate::db::{audit, periods, records};
use crate::errors::{AppError, AppResult, EditField, FieldViolation};
use crate::models::audit::AuditAction;
use crate::models::conflict_state::ConflictState;
use crate::models::record::{AttendanceRecord, compute_total_hours};
use chrono::Local;
use rusqlite::Transaction;
use serde_json::json;

fn snapshot(r: &AttendanceRecord) -> serde_json::Value {
    json!({
        "date": r.date_str(),
        "clock_in": records::ts_to_db(&r.clock_in),
        "clock_out": records::ts_to_db(&r.clock_out),
        "total_hours": r.total_hours,
        "conflict": r.conflict.label(),
        "period_id": r.period_id,
    })
}

/// Apply a validated edit and return the stored record.
pub fn edit_record(
    pool: &mut DbPool,
    record_id: i64,
    edit: &RecordEdit,
    actor: &str,
    validator: &EditValidator,
) -> AppResult<AttendanceRecord> {
    let result = require_actor(actor).and_then(|actor| {
        let tx = pool.write_tx()?;
        let rec = edit_in_tx(&tx, record_id, edit, actor, validator)?;
        tx.commit()?;
        Ok(rec)
    });

    match &result {
        Ok(r) => tracing::info!(record_id, actor, date = %r.date, "record edited"),
        Err(e) => trace_failure("edit", record_id, actor, e),
    }
    result
}

fn edit_in_tx(
    tx: &Transaction,
    record_id: i64,
    edit: &RecordEdit,
    actor: &str,
    validator: &EditValidator,
) -> AppResult<AttendanceRecord> {
    // The period may have been finalized since the form was opened.
    let (original, verdict) = check_record(tx, record_id)?;
    verdict.ensure()?;

    let valid = validator.check(edit, &original)?;

    // Where the record will live after the edit.
    let mut target_period = original.period_id;
    match original.period_id {
        Some(pid) => {
            let owner =
                periods::load_period(tx, pid)?.ok_or_else(|| AppError::not_found_period(pid))?;
            if !owner.contains(valid.date) {
                return Err(AppError::Validation(vec![FieldViolation::new(
                    EditField::Date,
                    format!(
                        "Date must stay within its period ({} → {})",
                        owner.start_date, owner.end_date
                    ),
                )]));
            }
        }
        None => {
            if let Some(p) = periods::find_overlapping(tx, &valid.date, &valid.date)? {
                if p.status.is_closed() {
                    return Err(AppError::InvalidState(format!(
                        "{} falls in period #{} which is {}",
                        valid.date,
                        p.id.unwrap_or_default(),
                        p.status.to_db_str()
                    )));
                }
                target_period = p.id;
            }
        }
    }

    let mut updated = original.clone();
    updated.date = valid.date;
    updated.clock_in = valid.clock_in;
    updated.clock_out = valid.clock_out;
    updated.total_hours = compute_total_hours(valid.clock_in, valid.clock_out);
    updated.conflict = ConflictState::ConfirmedResolved;
    updated.note = valid.reason;
    updated.resolved_by = Some(actor.to_string());
    updated.updated_at = Some(Local::now().to_rfc3339());

    records::update_record_times(tx, &updated)?;
    if target_period != original.period_id {
        if let Some(pid) = target_period {
            records::set_period(tx, record_id, pid)?;
        }
    }

    let stored =
        records::load_record(tx, record_id)?.ok_or_else(|| AppError::not_found_record(record_id))?;

    audit::append(
        tx,
        actor,
        AuditAction::Edit,
        record_id,
        &snapshot(&original).to_string(),
        &json!({ "record": snapshot(&stored), "reason": stored.note }).to_string(),
    )?;

    Ok(stored)
}

/// Record an operator's decision on a flagged record.
pub fn resolve_conflict(
    pool: &mut DbPool,
    record_id: i64,
    actor: &str,
    accept: bool,
    note: Option<&str>,
) -> AppResult<AttendanceRecord> {
    let result = require_actor(actor).and_then(|actor| {
        let tx = pool.write_tx()?;

        let (original, verdict) = check_record(&tx, record_id)?;
        verdict.ensure()?;

        let state = if accept {
            ConflictState::ConfirmedResolved
        } else {
            ConflictState::RejectedResolution
        };
        let note = note.map(str::trim).filter(|n| !n.is_empty());

        records::update_conflict(&tx, record_id, state, actor, note)?;

        let stored = records::load_record(&tx, record_id)?
            .ok_or_else(|| AppError::not_found_record(record_id))?;

        audit::append(
            &tx,
            actor,
            AuditAction::Resolve,
            record_id,
            &json!({ "conflict": original.conflict.label() }).to_string(),
            &json!({ "conflict": stored.conflict.label(), "note": note }).to_string(),
        )?;

        tx.commit()?;
        Ok(stored)
    });

    match &result {
        Ok(r) => tracing::info!(record_id, actor, conflict = r.conflict.label(), "conflict resolved"),
        Err(e) => trace_failure("resolve", record_id, actor, e),
    }
    result
}

/// The engine seen through the client-side editing seam.
pub struct DbRecordEditor<'a> {
    pool: &'a mut DbPool,
    validator: EditValidator,
}

impl<'a> DbRecordEditor<'a> {
    pub fn new(pool: &'a mut DbPool, validator: EditValidator) -> Self {
        Self { pool, validator }
    }
}

impl RecordEditor for DbRecordEditor<'_> {
    fn fetch_record(&mut self, record_id: i64) -> AppResult<AttendanceRecord> {
        records::load_record(&self.pool.conn, record_id)?
            .ok_or_else(|| AppError::not_found_record(record_id))
    }

    fn submit_edit(
        &mut self,
        record_id: i64,
        edit: &RecordEdit,
        actor: &str,
    ) -> AppResult<AttendanceRecord> {
        edit_record(self.pool, record_id, edit, actor, &self.validator)
    }
}
