//! FINALIZED → PENDING with a mandatory reason. LOCKED periods are not
//! reachable through this path.

use crate::core::finalize::TransitionOutcome;
use crate::core::{require_actor, trace_failure};
use crate::db::pool::DbPool;
use crate::db::records::set_finalized_for_period;
use crate::db::{audit, periods};
use crate::errors::{AppError, AppResult};
use crate::models::audit::AuditAction;
use crate::models::period_status::PeriodStatus;
use rusqlite::Transaction;
use serde_json::json;

pub fn unlock_period(
    pool: &mut DbPool,
    period_id: i64,
    actor: &str,
    reason: &str,
) -> AppResult<TransitionOutcome> {
    // Rejected before any transaction is opened.
    let result = require_actor(actor).and_then(|actor| {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::MissingReason);
        }

        let tx = pool.write_tx()?;
        let outcome = unlock_in_tx(&tx, period_id, actor, reason)?;
        tx.commit()?;
        Ok(outcome)
    });

    match &result {
        Ok(o) => tracing::info!(
            period_id,
            actor,
            affected = o.affected_records,
            "period unlocked"
        ),
        Err(e) => trace_failure("unlock", period_id, actor, e),
    }
    result
}

fn unlock_in_tx(
    tx: &Transaction,
    period_id: i64,
    actor: &str,
    reason: &str,
) -> AppResult<TransitionOutcome> {
    let period =
        periods::load_period(tx, period_id)?.ok_or_else(|| AppError::not_found_period(period_id))?;

    match period.status {
        PeriodStatus::Finalized => {}
        PeriodStatus::Locked => {
            return Err(AppError::InvalidState(format!(
                "Period #{} is LOCKED; it requires the administrative reopen procedure",
                period_id
            )));
        }
        PeriodStatus::Pending => {
            return Err(AppError::InvalidState(format!(
                "Period #{} is not finalized",
                period_id
            )));
        }
    }

    periods::mark_unlocked(tx, period_id, reason)?;

    let affected = set_finalized_for_period(tx, period_id, false)?;

    let before = json!({
        "status": period.status.to_db_str(),
        "finalized_by": period.finalized_by,
        "finalized_at": period.finalized_at,
    })
    .to_string();
    let after = json!({
        "status": PeriodStatus::Pending.to_db_str(),
        "unlock_reason": reason,
        "affected_records": affected,
    })
    .to_string();
    audit::append(tx, actor, AuditAction::Unlock, period_id, &before, &after)?;

    let updated =
        periods::load_period(tx, period_id)?.ok_or_else(|| AppError::not_found_period(period_id))?;

    Ok(TransitionOutcome {
        period: updated,
        affected_records: affected,
    })
}
