use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::export::export_period;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, warning};
use std::io::{self, Write};
use std::path::Path;

/// Ask before overwriting an existing file unless `force` is set.
fn ensure_writable(path: &Path, force: bool) -> AppResult<()> {
    if !path.exists() || force {
        return Ok(());
    }

    warning(format!("The file '{}' already exists.", path.display()));

    print!("Overwrite? [y/N]: ");
    io::stdout().flush().ok();

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    let ans = answer.trim().to_ascii_lowercase();

    if ans == "y" || ans == "yes" {
        info("Existing file will be overwritten.");
        Ok(())
    } else {
        Err(AppError::InvalidInput(
            "export cancelled: existing file not overwritten".to_string(),
        ))
    }
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        id,
        format,
        file,
        force,
    } = cmd
    {
        let path = Path::new(file);
        ensure_writable(path, *force)?;

        let pool = open_pool(cfg)?;
        export_period(&pool.conn, *id, *format, path)?;
    }
    Ok(())
}
