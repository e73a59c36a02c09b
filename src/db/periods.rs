use crate::db::records::date_to_db;
use crate::errors::{AppError, AppResult};
use crate::models::period::AttendancePeriod;
use crate::models::period_status::PeriodStatus;
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

pub fn map_row(row: &Row) -> Result<AttendancePeriod> {
    let parse_date = |col: &str| -> Result<NaiveDate> {
        let raw: String = row.get(col)?;
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                Type::Text,
                Box::new(AppError::InvalidDate(raw.clone())),
            )
        })
    };

    let status_str: String = row.get("status")?;
    let status = PeriodStatus::from_db_str(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            Type::Text,
            Box::new(AppError::Other(format!("Invalid period status: {}", status_str))),
        )
    })?;

    Ok(AttendancePeriod {
        id: Some(row.get("id")?),
        start_date: parse_date("start_date")?,
        end_date: parse_date("end_date")?,
        status,
        finalized_by: row.get("finalized_by")?,
        finalized_at: row.get("finalized_at")?,
        unlock_reason: row.get("unlock_reason")?,
        created_by: row.get("created_by")?,
        created_at: row.get("created_at")?,
    })
}

pub fn load_period(conn: &Connection, id: i64) -> AppResult<Option<AttendancePeriod>> {
    let p = conn
        .query_row("SELECT * FROM periods WHERE id = ?1", [id], map_row)
        .optional()?;
    Ok(p)
}

/// First period sharing at least one day with `start..=end`.
pub fn find_overlapping(
    conn: &Connection,
    start: &NaiveDate,
    end: &NaiveDate,
) -> AppResult<Option<AttendancePeriod>> {
    let p = conn
        .query_row(
            "SELECT * FROM periods
             WHERE start_date <= ?2 AND end_date >= ?1
             ORDER BY start_date ASC
             LIMIT 1",
            [date_to_db(start), date_to_db(end)],
            map_row,
        )
        .optional()?;
    Ok(p)
}

pub fn list_periods(conn: &Connection) -> AppResult<Vec<AttendancePeriod>> {
    let mut stmt = conn.prepare("SELECT * FROM periods ORDER BY start_date ASC")?;
    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn insert_period(
    conn: &Connection,
    start: &NaiveDate,
    end: &NaiveDate,
    created_by: &str,
    created_at: &str,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO periods (start_date, end_date, status, created_by, created_at)
         VALUES (?1, ?2, 'PENDING', ?3, ?4)",
        params![date_to_db(start), date_to_db(end), created_by, created_at],
    )?;
    Ok(conn.last_insert_rowid())
}

/// PENDING → FINALIZED. Guarded on the prior status so a lost race can never
/// overwrite another writer's result.
pub fn mark_finalized(conn: &Connection, id: i64, actor: &str, at: &str) -> AppResult<()> {
    let n = conn.execute(
        "UPDATE periods
         SET status = 'FINALIZED', finalized_by = ?1, finalized_at = ?2
         WHERE id = ?3 AND status = 'PENDING'",
        params![actor, at, id],
    )?;
    if n != 1 {
        return Err(AppError::InvalidState(format!(
            "Period #{} is no longer PENDING",
            id
        )));
    }
    Ok(())
}

/// FINALIZED → PENDING. finalized_by / finalized_at are left untouched.
pub fn mark_unlocked(conn: &Connection, id: i64, reason: &str) -> AppResult<()> {
    let n = conn.execute(
        "UPDATE periods
         SET status = 'PENDING', unlock_reason = ?1
         WHERE id = ?2 AND status = 'FINALIZED'",
        params![reason, id],
    )?;
    if n != 1 {
        return Err(AppError::InvalidState(format!(
            "Period #{} is no longer FINALIZED",
            id
        )));
    }
    Ok(())
}
