use crate::cli::commands::period::print_period;
use crate::cli::commands::{open_pool, print_json, resolve_actor};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::report::OperationReport;
use crate::core::unlock::unlock_period;
use crate::errors::AppResult;
use crate::ui::messages::success;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Unlock { id, reason } = &cli.command {
        let mut pool = open_pool(cfg)?;
        let result = unlock_period(&mut pool, *id, &resolve_actor(cli, cfg), reason);

        if cli.json {
            print_json(&OperationReport::from_result(&result))?;
        }

        let outcome = result?;
        if !cli.json {
            success(format!(
                "Period #{} reopened: {} record(s) unlocked",
                id, outcome.affected_records
            ));
            print_period(&outcome.period);
        }
    }
    Ok(())
}
