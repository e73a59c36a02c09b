use crate::cli::commands::{open_pool, print_json, resolve_actor};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::ingest::ingest_record;
use crate::db::records::NewRecord;
use crate::errors::{AppError, AppResult};
use crate::models::conflict_state::ConflictState;
use crate::ui::messages::success;
use crate::utils::date::parse_date;
use crate::utils::time::parse_optional_stamp;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Ingest(args) = &cli.command {
        let date = parse_date(&args.date).ok_or_else(|| AppError::InvalidDate(args.date.clone()))?;
        let conflict = ConflictState::from_code(&args.conflict).ok_or_else(|| {
            AppError::InvalidInput(format!("unknown conflict state '{}'", args.conflict))
        })?;

        let rec = NewRecord {
            employee_id: args.employee.trim().to_string(),
            date,
            transaction_id: args.transaction.trim().to_string(),
            clock_in: parse_optional_stamp(date, args.clock_in.as_ref())?,
            clock_out: parse_optional_stamp(date, args.clock_out.as_ref())?,
            conflict,
        };

        let mut pool = open_pool(cfg)?;
        let stored = ingest_record(&mut pool, &rec, &resolve_actor(cli, cfg))?;

        if cli.json {
            print_json(&stored)?;
        } else {
            success(format!(
                "Record #{} stored: {} on {} ({} → {})",
                stored.id,
                stored.employee_id,
                stored.date_str(),
                stored.clock_in_str(),
                stored.clock_out_str()
            ));
        }
    }
    Ok(())
}
