//! Server-side attendance engine: validation, the editability guard, period
//! checks and the finalize / unlock transactions.

pub mod audit_trail;
pub mod edit;
pub mod export;
pub mod finalize;
pub mod guard;
pub mod ingest;
pub mod period;
pub mod period_check;
pub mod report;
pub mod summary;
pub mod unlock;
pub mod validator;

use crate::errors::{AppError, AppResult, ErrorKind};

/// Authentication happens upstream; here an actor id only has to be present.
pub fn require_actor(actor: &str) -> AppResult<&str> {
    let a = actor.trim();
    if a.is_empty() {
        return Err(AppError::MissingActor);
    }
    Ok(a)
}

/// Emit the diagnostic line for a failed operation: full context for system
/// failures at error level, expected rejections at info.
pub(crate) fn trace_failure(operation: &str, entity_id: i64, actor: &str, err: &AppError) {
    match err.kind() {
        ErrorKind::SystemError => {
            tracing::error!(operation, entity_id, actor, error = %err, "operation failed");
        }
        kind => {
            tracing::info!(operation, entity_id, actor, code = kind.code(), error = %err, "operation rejected");
        }
    }
}
