//! Maintenance journal kept in the `log` table: migration markers, init and
//! integrity checks. Separate from the audit trail.

use crate::errors::AppResult;
use chrono::Local;
use rusqlite::{Connection, params};

pub const MIGRATION_APPLIED: &str = "migration_applied";

pub fn note_maintenance(
    conn: &Connection,
    operation: &str,
    target: &str,
    message: &str,
) -> AppResult<()> {
    conn.prepare_cached(
        "INSERT INTO log (date, operation, target, message) VALUES (?1, ?2, ?3, ?4)",
    )?
    .execute(params![Local::now().to_rfc3339(), operation, target, message])?;
    Ok(())
}
