//! One handler per subcommand. Handlers print; the engine under `core`
//! never does except for export progress.

pub mod config;
pub mod db;
pub mod edit;
pub mod export;
pub mod finalize;
pub mod ingest;
pub mod init;
pub mod log;
pub mod period;
pub mod review;
pub mod unlock;

use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::utils::date::parse_range;
use chrono::NaiveDate;
use serde::Serialize;

/// `--actor`, else the configured operator. Empty when neither is set; the
/// engine rejects that.
pub(crate) fn resolve_actor(cli: &Cli, cfg: &Config) -> String {
    cli.actor
        .clone()
        .or_else(|| cfg.operator.clone())
        .unwrap_or_default()
}

pub(crate) fn open_pool(cfg: &Config) -> AppResult<DbPool> {
    DbPool::with_busy_timeout(&cfg.database, cfg.busy_timeout_ms)
}

pub(crate) fn range_args(start: &str, end: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    parse_range(start, end).map_err(AppError::InvalidRange)
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
