//! Payroll hand-off: a finalized period's records written as CSV or JSON.

use crate::db::periods;
use crate::db::records::{self, RecordScope};
use crate::errors::{AppError, AppResult};
use crate::models::period::AttendancePeriod;
use crate::models::record::AttendanceRecord;
use crate::ui::messages::{info, success};
use clap::ValueEnum;
use rusqlite::Connection;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Flat row consumed by payroll.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct PayrollRow {
    pub record_id: i64,
    pub employee_id: String,
    pub date: String,
    pub clock_in: Option<String>,
    pub clock_out: Option<String>,
    pub total_hours: Option<f64>,
    pub period_id: i64,
}

impl PayrollRow {
    fn from_record(r: &AttendanceRecord, period_id: i64) -> Self {
        Self {
            record_id: r.id,
            employee_id: r.employee_id.clone(),
            date: r.date_str(),
            clock_in: r.clock_in.map(|t| t.format("%H:%M").to_string()),
            clock_out: r.clock_out.map(|t| t.format("%H:%M").to_string()),
            total_hours: r.total_hours,
            period_id,
        }
    }
}

/// Rows of a closed period. Fails with `InvalidState` unless the period is
/// FINALIZED or LOCKED and every attached record carries the finalized flag.
pub fn payroll_rows(
    conn: &Connection,
    period_id: i64,
) -> AppResult<(AttendancePeriod, Vec<PayrollRow>)> {
    let period =
        periods::load_period(conn, period_id)?.ok_or_else(|| AppError::not_found_period(period_id))?;

    if !period.status.is_closed() {
        return Err(AppError::InvalidState(format!(
            "Period #{} is {}; only finalized periods can be exported",
            period_id,
            period.status.to_db_str()
        )));
    }

    let recs = records::load_records(conn, RecordScope::Period(period_id))?;
    let open = recs.iter().filter(|r| !r.is_finalized).count();
    if open > 0 {
        return Err(AppError::InvalidState(format!(
            "Period #{} has {} record(s) not marked finalized",
            period_id, open
        )));
    }

    let rows = recs
        .iter()
        .map(|r| PayrollRow::from_record(r, period_id))
        .collect();
    Ok((period, rows))
}

/// Write the period's payroll rows to `path`. Returns the number of rows.
pub fn export_period(
    conn: &Connection,
    period_id: i64,
    format: ExportFormat,
    path: &Path,
) -> AppResult<usize> {
    let (period, rows) = payroll_rows(conn, period_id)?;
    info(format!(
        "Exporting period {} to {}: {}",
        period.label(),
        format.as_str().to_uppercase(),
        path.display()
    ));

    match format {
        ExportFormat::Csv => write_csv(&rows, path)?,
        ExportFormat::Json => write_json(&rows, path)?,
    }

    tracing::info!(period_id, rows = rows.len(), format = format.as_str(), "period exported");
    success(format!(
        "{} export completed: {} ({} rows)",
        format.as_str().to_uppercase(),
        path.display(),
        rows.len()
    ));
    Ok(rows.len())
}

fn write_json(rows: &[PayrollRow], path: &Path) -> AppResult<()> {
    let json_data = serde_json::to_string_pretty(rows)?;
    let mut file = File::create(path)?;
    file.write_all(json_data.as_bytes())?;
    Ok(())
}

/// Header comes from the serde field names.
fn write_csv(rows: &[PayrollRow], path: &Path) -> AppResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
