//! PENDING → FINALIZED, all-or-nothing.

use crate::core::{require_actor, trace_failure};
use crate::db::pool::DbPool;
use crate::db::records::{RecordScope, record_stats, set_finalized_for_period};
use crate::db::{audit, periods};
use crate::errors::{AppError, AppResult};
use crate::models::audit::AuditAction;
use crate::models::period::AttendancePeriod;
use crate::models::period_status::PeriodStatus;
use chrono::Local;
use rusqlite::Transaction;
use serde::Serialize;
use serde_json::json;

/// Result of a successful finalize or unlock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionOutcome {
    pub period: AttendancePeriod,
    pub affected_records: usize,
}

/// Finalize a period and lock every record attached to it.
///
/// A second call after a committed finalize fails with `InvalidState`; callers
/// must read that as "already done". Concurrent callers are serialized by the
/// store's write lock and the loser sees the same `InvalidState`.
pub fn finalize_period(pool: &mut DbPool, period_id: i64, actor: &str) -> AppResult<TransitionOutcome> {
    let result = require_actor(actor).and_then(|actor| {
        let tx = pool.write_tx()?;
        let outcome = finalize_in_tx(&tx, period_id, actor)?;
        tx.commit()?;
        Ok(outcome)
    });

    match &result {
        Ok(o) => tracing::info!(
            period_id,
            actor,
            affected = o.affected_records,
            "period finalized"
        ),
        Err(e) => trace_failure("finalize", period_id, actor, e),
    }
    result
}

/// Transaction body. Any `Err` leaves `tx` uncommitted; dropping it rolls
/// back every write made here.
fn finalize_in_tx(tx: &Transaction, period_id: i64, actor: &str) -> AppResult<TransitionOutcome> {
    // 1. load
    let period =
        periods::load_period(tx, period_id)?.ok_or_else(|| AppError::not_found_period(period_id))?;

    // 2. lifecycle state
    if period.status != PeriodStatus::Pending {
        return Err(AppError::InvalidState(format!(
            "Period #{} is {} and cannot be finalized",
            period_id,
            period.status.to_db_str()
        )));
    }

    // 3. re-validate inside the transaction, whatever the caller previewed
    let stats = record_stats(tx, RecordScope::Period(period_id))?;
    if !stats.issues.is_clear() {
        return Err(AppError::Precondition(stats.issues.to_issues()));
    }

    // 4. period
    let now = Local::now().to_rfc3339();
    periods::mark_finalized(tx, period_id, actor, &now)?;

    // 5. records
    let affected = set_finalized_for_period(tx, period_id, true)?;

    // 6. audit
    let before = json!({ "status": period.status.to_db_str() }).to_string();
    let after = json!({
        "status": PeriodStatus::Finalized.to_db_str(),
        "finalized_by": actor,
        "finalized_at": now,
        "affected_records": affected,
    })
    .to_string();
    audit::append(tx, actor, AuditAction::Finalize, period_id, &before, &after)?;

    let updated =
        periods::load_period(tx, period_id)?.ok_or_else(|| AppError::not_found_period(period_id))?;

    Ok(TransitionOutcome {
        period: updated,
        affected_records: affected,
    })
}
