use crate::cli::commands::{open_pool, print_json, resolve_actor};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::edit::{edit_record, resolve_conflict};
use crate::core::guard::check_record;
use crate::core::validator::{EditValidator, RecordEdit};
use crate::errors::AppResult;
use crate::models::record::AttendanceRecord;
use crate::ui::messages::success;
use crate::utils::date::today;

/// Omitted flags keep the record's current values.
fn edit_from_args(
    original: &AttendanceRecord,
    date: &Option<String>,
    clock_in: &Option<String>,
    clock_out: &Option<String>,
    reason: &str,
) -> RecordEdit {
    let hhmm = |ts: Option<chrono::NaiveDateTime>| ts.map(|t| t.format("%H:%M").to_string());
    RecordEdit {
        date: date.clone().unwrap_or_else(|| original.date_str()),
        clock_in: clock_in.clone().or_else(|| hhmm(original.clock_in)),
        clock_out: clock_out.clone().or_else(|| hhmm(original.clock_out)),
        reason: reason.to_string(),
    }
}

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Edit(args) => {
            let mut pool = open_pool(cfg)?;
            let (original, _) = check_record(&pool.conn, args.id)?;
            let edit = edit_from_args(
                &original,
                &args.date,
                &args.clock_in,
                &args.clock_out,
                &args.reason,
            );
            let validator = EditValidator::new(today(), cfg.shift_limits());

            let stored = edit_record(
                &mut pool,
                args.id,
                &edit,
                &resolve_actor(cli, cfg),
                &validator,
            )?;

            if cli.json {
                print_json(&stored)?;
            } else {
                success(format!(
                    "Record #{} updated: {} {} → {} ({})",
                    stored.id,
                    stored.date_str(),
                    stored.clock_in_str(),
                    stored.clock_out_str(),
                    stored.note
                ));
            }
        }
        Commands::Resolve {
            id,
            accept,
            reject: _,
            note,
        } => {
            let mut pool = open_pool(cfg)?;
            let stored = resolve_conflict(
                &mut pool,
                *id,
                &resolve_actor(cli, cfg),
                *accept,
                note.as_deref(),
            )?;

            if cli.json {
                print_json(&stored)?;
            } else {
                success(format!(
                    "Record #{} marked {}",
                    stored.id,
                    stored.conflict.label()
                ));
            }
        }
        _ => {}
    }
    Ok(())
}
