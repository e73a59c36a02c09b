use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::migrate::{applied_versions, run_pending_migrations};
use crate::errors::{AppError, AppResult};
use crate::utils::colors::{CYAN, GREEN, RED, RESET};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Db { migrate, check } = cmd {
        let pool = open_pool(cfg)?;

        if *migrate {
            println!("{}▶ Running migrations…{}", CYAN, RESET);
            run_pending_migrations(&pool.conn)?;
            for v in applied_versions(&pool.conn)? {
                println!("  {}", v);
            }
            println!("{}✔ Migration completed.{}\n", GREEN, RESET);
        }

        if *check {
            println!("{}▶ Running integrity check…{}", CYAN, RESET);

            let integrity: String = pool
                .conn
                .query_row("PRAGMA integrity_check;", [], |row| row.get(0))?;

            if integrity == "ok" {
                println!("{}✔ Integrity check passed.{}\n", GREEN, RESET);
            } else {
                println!("{}✘ Integrity check failed:{} {}\n", RED, RESET, integrity);
                return Err(AppError::Other(format!("integrity check failed: {}", integrity)));
            }
        }
    }

    Ok(())
}
