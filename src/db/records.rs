use crate::errors::{AppError, AppResult};
use crate::models::conflict_state::ConflictState;
use crate::models::issue::IssueCounts;
use crate::models::record::{AttendanceRecord, TIMESTAMP_FORMAT};
use chrono::{Local, NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

/// Which records an aggregate or listing query runs over.
#[derive(Debug, Clone, Copy)]
pub enum RecordScope {
    /// Every record whose date falls in the inclusive range.
    Range(NaiveDate, NaiveDate),
    /// Every record associated to the period id.
    Period(i64),
}

impl RecordScope {
    fn where_clause(&self) -> &'static str {
        match self {
            RecordScope::Range(..) => "date BETWEEN ?1 AND ?2",
            RecordScope::Period(_) => "period_id = ?1",
        }
    }

    fn params(&self) -> Vec<Box<dyn rusqlite::ToSql>> {
        match self {
            RecordScope::Range(s, e) => vec![Box::new(date_to_db(s)), Box::new(date_to_db(e))],
            RecordScope::Period(id) => vec![Box::new(*id)],
        }
    }
}

/// Aggregates over a scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordStats {
    pub total_records: i64,
    pub employee_count: i64,
    pub issues: IssueCounts,
}

/// Raw row handed over by ingestion.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub employee_id: String,
    pub date: NaiveDate,
    pub transaction_id: String,
    pub clock_in: Option<NaiveDateTime>,
    pub clock_out: Option<NaiveDateTime>,
    pub conflict: ConflictState,
}

pub fn date_to_db(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

pub fn ts_to_db(ts: &Option<NaiveDateTime>) -> Option<String> {
    ts.map(|t| t.format(TIMESTAMP_FORMAT).to_string())
}

fn conversion_error(idx: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_ts(idx: usize, raw: Option<String>) -> Result<Option<NaiveDateTime>> {
    match raw {
        None => Ok(None),
        Some(s) => NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT)
            .map(Some)
            .map_err(|_| conversion_error(idx, AppError::InvalidTime(s.clone()))),
    }
}

pub fn map_row(row: &Row) -> Result<AttendanceRecord> {
    let date_str: String = row.get("date")?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|_| conversion_error(0, AppError::InvalidDate(date_str.clone())))?;

    let clock_in = parse_ts(0, row.get("clock_in")?)?;
    let clock_out = parse_ts(0, row.get("clock_out")?)?;

    let raw_conflict: Option<i64> = row.get("conflict_resolved")?;
    let conflict = ConflictState::from_db(raw_conflict).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            Type::Integer,
            Box::new(AppError::Other(format!(
                "Invalid conflict_resolved value: {:?}",
                raw_conflict
            ))),
        )
    })?;

    Ok(AttendanceRecord {
        id: row.get("id")?,
        employee_id: row.get("employee_id")?,
        date,
        transaction_id: row.get("transaction_id")?,
        clock_in,
        clock_out,
        total_hours: row.get("total_hours")?,
        conflict,
        period_id: row.get("period_id")?,
        is_finalized: row.get::<_, i64>("is_finalized")? == 1,
        note: row.get("note")?,
        resolved_by: row.get("resolved_by")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn insert_record(conn: &Connection, rec: &NewRecord) -> AppResult<i64> {
    let total = crate::models::record::compute_total_hours(rec.clock_in, rec.clock_out);

    conn.execute(
        "INSERT INTO records (employee_id, date, transaction_id, clock_in, clock_out,
                              total_hours, conflict_resolved, period_id, is_finalized, note, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, 0, '', ?8)",
        params![
            rec.employee_id,
            date_to_db(&rec.date),
            rec.transaction_id,
            ts_to_db(&rec.clock_in),
            ts_to_db(&rec.clock_out),
            total,
            rec.conflict.to_db(),
            Local::now().to_rfc3339(),
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

pub fn load_record(conn: &Connection, id: i64) -> AppResult<Option<AttendanceRecord>> {
    let rec = conn
        .query_row("SELECT * FROM records WHERE id = ?1", [id], map_row)
        .optional()?;
    Ok(rec)
}

pub fn load_records(conn: &Connection, scope: RecordScope) -> AppResult<Vec<AttendanceRecord>> {
    let sql = format!(
        "SELECT * FROM records WHERE {} ORDER BY date ASC, employee_id ASC, id ASC",
        scope.where_clause()
    );
    let mut stmt = conn.prepare(&sql)?;
    let params = scope.params();
    let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Record count, distinct employees and the three issue counters in one pass.
pub fn record_stats(conn: &Connection, scope: RecordScope) -> AppResult<RecordStats> {
    let sql = format!(
        "SELECT
            COUNT(*),
            COUNT(DISTINCT employee_id),
            COALESCE(SUM(CASE WHEN conflict_resolved IS NULL OR conflict_resolved = 0
                              THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN conflict_resolved IS NULL THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN clock_in IS NULL AND clock_out IS NULL
                              THEN 1 ELSE 0 END), 0)
         FROM records
         WHERE {}",
        scope.where_clause()
    );

    let params = scope.params();
    let stats = conn.query_row(&sql, rusqlite::params_from_iter(params.iter()), |row| {
        Ok(RecordStats {
            total_records: row.get(0)?,
            employee_count: row.get(1)?,
            issues: IssueCounts {
                unresolved_conflicts: row.get(2)?,
                pending_approvals: row.get(3)?,
                missing_data: row.get(4)?,
            },
        })
    })?;

    Ok(stats)
}

/// Persist the editable fields of a record after a validated edit.
pub fn update_record_times(conn: &Connection, rec: &AttendanceRecord) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE records
         SET date = ?1, clock_in = ?2, clock_out = ?3, total_hours = ?4,
             conflict_resolved = ?5, note = ?6, resolved_by = ?7, updated_at = ?8
         WHERE id = ?9 AND is_finalized = 0",
        params![
            date_to_db(&rec.date),
            ts_to_db(&rec.clock_in),
            ts_to_db(&rec.clock_out),
            rec.total_hours,
            rec.conflict.to_db(),
            rec.note,
            rec.resolved_by,
            rec.updated_at,
            rec.id,
        ],
    )?;

    if changed == 0 {
        return Err(AppError::InvalidState(format!(
            "Record #{} is part of a finalized period",
            rec.id
        )));
    }
    Ok(())
}

/// Attach every unassigned record in the range to `period_id`.
pub fn associate_unassigned(
    conn: &Connection,
    start: &NaiveDate,
    end: &NaiveDate,
    period_id: i64,
) -> AppResult<usize> {
    let n = conn.execute(
        "UPDATE records SET period_id = ?1
         WHERE period_id IS NULL AND date BETWEEN ?2 AND ?3",
        params![period_id, date_to_db(start), date_to_db(end)],
    )?;
    Ok(n)
}

/// Bulk lock/unlock of a period's records. Returns affected rows.
pub fn set_finalized_for_period(conn: &Connection, period_id: i64, value: bool) -> AppResult<usize> {
    let n = conn.execute(
        "UPDATE records SET is_finalized = ?1 WHERE period_id = ?2",
        params![if value { 1 } else { 0 }, period_id],
    )?;
    Ok(n)
}

/// Persist a conflict decision on an editable record.
pub fn update_conflict(
    conn: &Connection,
    id: i64,
    state: ConflictState,
    resolved_by: &str,
    note: Option<&str>,
) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE records
         SET conflict_resolved = ?1, resolved_by = ?2, note = COALESCE(?3, note), updated_at = ?4
         WHERE id = ?5 AND is_finalized = 0",
        params![state.to_db(), resolved_by, note, Local::now().to_rfc3339(), id],
    )?;

    if changed == 0 {
        return Err(AppError::InvalidState(format!(
            "Record #{} is part of a finalized period",
            id
        )));
    }
    Ok(())
}

/// Attach one record to a period.
pub fn set_period(conn: &Connection, id: i64, period_id: i64) -> AppResult<()> {
    conn.execute(
        "UPDATE records SET period_id = ?1 WHERE id = ?2",
        params![period_id, id],
    )?;
    Ok(())
}
