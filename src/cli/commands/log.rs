use crate::cli::commands::{open_pool, print_json};
use crate::cli::parser::Cli;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::audit_trail::{audit_trail, print_trail};
use crate::errors::AppResult;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Log {
        print: true,
        period,
        record,
    } = &cli.command
    {
        let pool = open_pool(cfg)?;

        let filter = match (period, record) {
            (Some(id), _) => Some(("period", *id)),
            (None, Some(id)) => Some(("record", *id)),
            (None, None) => None,
        };

        let entries = audit_trail(&pool.conn, filter)?;
        if cli.json {
            print_json(&entries)?;
        } else {
            print_trail(&entries)?;
        }
    }

    Ok(())
}
