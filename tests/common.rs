#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{NaiveDate, NaiveTime};
use rattendance::core::ingest::ingest_record;
use rattendance::db::initialize::init_db;
use rattendance::db::pool::DbPool;
use rattendance::db::records::{NewRecord, load_record};
use rattendance::models::conflict_state::ConflictState;
use rattendance::models::record::AttendanceRecord;
use rusqlite::params;
use std::env;
use std::fs;
use std::path::PathBuf;

pub const ACTOR: &str = "hr-ops";

pub fn rat() -> Command {
    cargo_bin_cmd!("rattendance")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rattendance.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rattendance_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Fresh, migrated database for library-level tests.
pub fn fresh_pool(name: &str) -> (String, DbPool) {
    let path = setup_test_db(name);
    let pool = DbPool::new(&path).expect("open db");
    init_db(&pool.conn).expect("init db");
    (path, pool)
}

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date")
}

/// Ingest one record through the engine and return its id.
pub fn add_record(
    pool: &mut DbPool,
    employee: &str,
    date: &str,
    tx: &str,
    clock_in: Option<&str>,
    clock_out: Option<&str>,
    conflict: ConflictState,
) -> i64 {
    let day = d(date);
    let at = |t: &str| day.and_time(NaiveTime::parse_from_str(t, "%H:%M").expect("time"));

    let rec = NewRecord {
        employee_id: employee.to_string(),
        date: day,
        transaction_id: tx.to_string(),
        clock_in: clock_in.map(&at),
        clock_out: clock_out.map(&at),
        conflict,
    };
    ingest_record(pool, &rec, ACTOR).expect("ingest").id
}

/// A resolved, complete 09:00–17:00 record.
pub fn add_clean(pool: &mut DbPool, employee: &str, date: &str, tx: &str) -> i64 {
    add_record(
        pool,
        employee,
        date,
        tx,
        Some("09:00"),
        Some("17:00"),
        ConflictState::ConfirmedResolved,
    )
}

/// Ingestion refuses rows without any clock value, so these go in raw.
pub fn add_missing_data(pool: &DbPool, employee: &str, date: &str, tx: &str) -> i64 {
    pool.conn
        .execute(
            "INSERT INTO records (employee_id, date, transaction_id, conflict_resolved, is_finalized, note)
             VALUES (?1, ?2, ?3, 1, 0, '')",
            params![employee, date, tx],
        )
        .expect("raw insert");
    pool.conn.last_insert_rowid()
}

/// LOCKED has no transition in the engine; tests put periods there directly.
pub fn force_locked(pool: &DbPool, period_id: i64) {
    pool.conn
        .execute(
            "UPDATE periods SET status = 'LOCKED' WHERE id = ?1",
            [period_id],
        )
        .expect("lock period");
    pool.conn
        .execute(
            "UPDATE records SET is_finalized = 1 WHERE period_id = ?1",
            [period_id],
        )
        .expect("lock records");
}

/// Every later audit insert aborts, as if the audit store had gone away.
pub fn fail_audit_writes(pool: &DbPool) {
    pool.conn
        .execute_batch(
            "CREATE TRIGGER audit_down BEFORE INSERT ON audit_log
             BEGIN SELECT RAISE(ABORT, 'audit down'); END;",
        )
        .expect("install trigger");
}

pub fn record(pool: &DbPool, id: i64) -> AttendanceRecord {
    load_record(&pool.conn, id).expect("load").expect("record exists")
}

pub fn finalized_count(pool: &DbPool, period_id: i64) -> i64 {
    pool.conn
        .query_row(
            "SELECT COUNT(*) FROM records WHERE period_id = ?1 AND is_finalized = 1",
            [period_id],
            |r| r.get(0),
        )
        .expect("count")
}

pub fn audit_count(pool: &DbPool, action: &str) -> i64 {
    pool.conn
        .query_row(
            "SELECT COUNT(*) FROM audit_log WHERE action = ?1",
            [action],
            |r| r.get(0),
        )
        .expect("count")
}
