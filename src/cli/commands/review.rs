//! Read-only decision screens: `validate` and `summary`.

use crate::cli::commands::{open_pool, print_json, range_args};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::period_check::validate_period;
use crate::core::summary::summarize;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};
use crate::utils::colors::{RESET, color_for_count, color_for_status};

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Validate { start, end } => {
            let (s, e) = range_args(start, end)?;
            let pool = open_pool(cfg)?;
            let v = validate_period(&pool.conn, s, e)?;

            if cli.json {
                print_json(&v)?;
            } else if v.can_finalize {
                success(format!("{} → {} can be finalized", s, e));
            } else {
                warning(format!("{} → {} cannot be finalized:", s, e));
                for issue in &v.issues {
                    println!("   • {:<22} {:>4}  {}", issue.kind.code(), issue.count, issue.message);
                }
            }
        }
        Commands::Summary { start, end } => {
            let (s, e) = range_args(start, end)?;
            let pool = open_pool(cfg)?;
            let sum = summarize(&pool.conn, s, e)?;

            if cli.json {
                print_json(&sum)?;
            } else {
                println!("📊 Summary {}", sum.period.label());
                println!(
                    "   Status            : {}{}{}",
                    color_for_status(sum.period.status),
                    sum.period.status.to_db_str(),
                    RESET
                );
                println!("   Records           : {}", sum.total_records);
                println!("   Employees         : {}", sum.employee_count);
                for (label, n) in [
                    ("Pending approvals", sum.pending_approvals),
                    ("Conflicts", sum.conflicts),
                    ("Missing data", sum.missing_data),
                ] {
                    println!("   {:<18}: {}{}{}", label, color_for_count(n), n, RESET);
                }
            }
        }
        _ => {}
    }
    Ok(())
}
