use crate::cli::commands::period::print_period;
use crate::cli::commands::{open_pool, print_json, resolve_actor};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::finalize::finalize_period;
use crate::core::report::OperationReport;
use crate::db::periods::load_period;
use crate::errors::{AppError, AppResult};
use crate::models::period_status::PeriodStatus;
use crate::ui::messages::{success, warning};

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Finalize { id } = &cli.command {
        let mut pool = open_pool(cfg)?;
        let result = finalize_period(&mut pool, *id, &resolve_actor(cli, cfg));

        if cli.json {
            print_json(&OperationReport::from_result(&result))?;
        }

        match result {
            Ok(outcome) => {
                if !cli.json {
                    success(format!(
                        "Period #{} finalized: {} record(s) locked",
                        id, outcome.affected_records
                    ));
                    print_period(&outcome.period);
                }
            }
            // A retry after a committed finalize, or the loser of a race.
            Err(AppError::InvalidState(_))
                if load_period(&pool.conn, *id)?
                    .is_some_and(|p| p.status == PeriodStatus::Finalized) =>
            {
                if !cli.json {
                    warning(format!("Period #{} is already finalized; nothing to do", id));
                }
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
