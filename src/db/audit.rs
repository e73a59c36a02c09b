//! Append-only audit trail. Entries are written with the same connection (and
//! therefore inside the same transaction) as the change they describe.

use crate::errors::{AppError, AppResult};
use crate::models::audit::{AuditAction, AuditEntry};
use chrono::Local;
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, Result, Row, params, params_from_iter};

pub fn append(
    conn: &Connection,
    actor: &str,
    action: AuditAction,
    entity_id: i64,
    before: &str,
    after: &str,
) -> AppResult<i64> {
    let now = Local::now().to_rfc3339();

    let mut stmt = conn.prepare_cached(
        "INSERT INTO audit_log (actor, action, entity_id, before, after, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    stmt.execute(params![
        actor,
        action.to_db_str(),
        entity_id,
        before,
        after,
        now
    ])?;

    Ok(conn.last_insert_rowid())
}

fn map_row(row: &Row) -> Result<AuditEntry> {
    let action_str: String = row.get("action")?;
    let action = AuditAction::from_db_str(&action_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            Type::Text,
            Box::new(AppError::Other(format!("Invalid audit action: {}", action_str))),
        )
    })?;

    Ok(AuditEntry {
        id: row.get("id")?,
        actor: row.get("actor")?,
        action,
        entity_id: row.get("entity_id")?,
        before: row.get("before")?,
        after: row.get("after")?,
        created_at: row.get("created_at")?,
    })
}

/// Whole trail, oldest first.
pub fn load_all(conn: &Connection) -> AppResult<Vec<AuditEntry>> {
    let mut stmt = conn.prepare_cached("SELECT * FROM audit_log ORDER BY id ASC")?;
    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Entries touching one entity, oldest first. Served from
/// `idx_audit_entity` through the actions that target `entity`.
pub fn load_for_entity(
    conn: &Connection,
    entity: &str,
    entity_id: i64,
) -> AppResult<Vec<AuditEntry>> {
    let actions: Vec<&str> = AuditAction::ALL
        .iter()
        .filter(|a| a.entity() == entity)
        .map(|a| a.to_db_str())
        .collect();
    if actions.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = (0..actions.len())
        .map(|i| format!("?{}", i + 2))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "SELECT * FROM audit_log
         WHERE action IN ({}) AND entity_id = ?1
         ORDER BY id ASC",
        placeholders
    );

    let mut args = vec![Value::Integer(entity_id)];
    args.extend(actions.iter().map(|a| Value::Text(a.to_string())));

    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(params_from_iter(args), map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
