use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::log::note_maintenance;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};
use rusqlite::Connection;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory and file (skipped with `--test`)
///  - the SQLite database
///  - all pending DB migrations
pub fn handle(cli: &Cli) -> AppResult<()> {
    let cfg = Config::init_all(cli.db.as_deref(), cli.test)?;
    let db_path = cfg.database.clone();

    println!("⚙️  Initializing rAttendance…");
    if !cli.test {
        println!("📄 Config file : {}", Config::config_file().display());
    }
    println!("🗄️  Database   : {}", &db_path);

    let conn = Connection::open(&db_path)?;
    init_db(&conn)?;

    // internal log is best effort
    if let Err(e) = note_maintenance(
        &conn,
        "init",
        "database",
        &format!("Database initialized at {}", &db_path),
    ) {
        warning(format!("Failed to write internal log: {}", e));
    }

    tracing::info!(database = %db_path, "database initialized");
    success(format!("Database initialized at {}", &db_path));
    Ok(())
}
