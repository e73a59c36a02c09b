use crate::db::log::{MIGRATION_APPLIED, note_maintenance};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension};

/// Ensure that the `log` table exists; it carries the migration markers.
fn ensure_log_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> AppResult<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = ?1 AND target = ?2
         LIMIT 1",
    )?;
    Ok(chk
        .query_row([MIGRATION_APPLIED, version], |_| Ok(()))
        .optional()?
        .is_some())
}

const INITIAL_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS periods (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        start_date     TEXT NOT NULL,
        end_date       TEXT NOT NULL,
        status         TEXT NOT NULL DEFAULT 'PENDING'
                       CHECK(status IN ('PENDING','FINALIZED','LOCKED')),
        finalized_by   TEXT,
        finalized_at   TEXT,
        unlock_reason  TEXT,
        created_by     TEXT,
        created_at     TEXT NOT NULL,
        CHECK(start_date <= end_date)
    );

    CREATE INDEX IF NOT EXISTS idx_periods_range ON periods(start_date, end_date);

    CREATE TABLE IF NOT EXISTS records (
        id                 INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id        TEXT NOT NULL,
        date               TEXT NOT NULL,
        transaction_id     TEXT NOT NULL,
        clock_in           TEXT,
        clock_out          TEXT,
        total_hours        REAL,
        conflict_resolved  INTEGER CHECK(conflict_resolved IN (0, 1)),
        period_id          INTEGER REFERENCES periods(id),
        is_finalized       INTEGER NOT NULL DEFAULT 0,
        note               TEXT NOT NULL DEFAULT '',
        resolved_by        TEXT,
        updated_at         TEXT
    );

    CREATE UNIQUE INDEX IF NOT EXISTS idx_records_identity
        ON records(employee_id, date, transaction_id);
    CREATE INDEX IF NOT EXISTS idx_records_date ON records(date);
    CREATE INDEX IF NOT EXISTS idx_records_period ON records(period_id);

    CREATE TRIGGER IF NOT EXISTS records_never_deleted
    BEFORE DELETE ON records
    BEGIN
        SELECT RAISE(ABORT, 'attendance records are never deleted');
    END;
"#;

const AUDIT_LOG_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS audit_log (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        actor       TEXT NOT NULL,
        action      TEXT NOT NULL,
        entity_id   INTEGER NOT NULL,
        before      TEXT NOT NULL DEFAULT '',
        after       TEXT NOT NULL DEFAULT '',
        created_at  TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_audit_entity ON audit_log(action, entity_id);

    CREATE TRIGGER IF NOT EXISTS audit_log_no_update
    BEFORE UPDATE ON audit_log
    BEGIN
        SELECT RAISE(ABORT, 'audit_log is append-only');
    END;

    CREATE TRIGGER IF NOT EXISTS audit_log_no_delete
    BEFORE DELETE ON audit_log
    BEGIN
        SELECT RAISE(ABORT, 'audit_log is append-only');
    END;
"#;

/// Ordered list of (version, description, sql).
const MIGRATIONS: &[(&str, &str, &str)] = &[
    (
        "20260112_0001_initial_schema",
        "Created periods and records tables",
        INITIAL_SCHEMA,
    ),
    (
        "20260205_0002_audit_log",
        "Created append-only audit_log table",
        AUDIT_LOG_SCHEMA,
    ),
];

/// Apply one migration and its marker atomically.
fn apply(conn: &Connection, version: &str, message: &str, sql: &str) -> AppResult<()> {
    if is_applied(conn, version)? {
        return Ok(());
    }

    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(sql)
        .map_err(|e| AppError::Migration(format!("{}: {}", version, e)))?;

    note_maintenance(&tx, MIGRATION_APPLIED, version, message)?;

    tx.commit()?;

    tracing::info!(version, "migration applied");
    success(format!("Migration applied: {} → {}", version, message));

    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> AppResult<()> {
    ensure_log_table(conn)?;

    for (version, message, sql) in MIGRATIONS {
        apply(conn, version, message, sql)?;
    }

    Ok(())
}

/// Versions already recorded in the `log` table, oldest first.
pub fn applied_versions(conn: &Connection) -> AppResult<Vec<String>> {
    ensure_log_table(conn)?;

    let mut stmt = conn.prepare(
        "SELECT target FROM log WHERE operation = ?1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([MIGRATION_APPLIED], |row| row.get::<_, String>(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
