use crate::cli::commands::{open_pool, print_json, range_args, resolve_actor};
use crate::cli::parser::{Cli, Commands, PeriodAction};
use crate::config::Config;
use crate::core::period::{create_period, get_period, records_for_period};
use crate::db::periods::list_periods;
use crate::errors::AppResult;
use crate::models::period::AttendancePeriod;
use crate::models::record::AttendanceRecord;
use crate::ui::messages::{info, success};
use crate::utils::colors::{GREY, RESET, color_for_conflict, color_for_status};
use serde_json::json;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Period { action } = &cli.command {
        let mut pool = open_pool(cfg)?;

        match action {
            PeriodAction::Create { start, end } => {
                let (s, e) = range_args(start, end)?;
                let created = create_period(&mut pool, s, e, &resolve_actor(cli, cfg))?;
                if cli.json {
                    print_json(&created)?;
                } else {
                    success(format!(
                        "Period {} created ({} record(s) attached)",
                        created.period.label(),
                        created.associated_records
                    ));
                }
            }
            PeriodAction::Show { id, records } => {
                let period = get_period(&pool.conn, *id)?;
                let recs = if *records {
                    records_for_period(&pool.conn, *id)?
                } else {
                    Vec::new()
                };

                if cli.json {
                    if *records {
                        print_json(&json!({ "period": period, "records": recs }))?;
                    } else {
                        print_json(&period)?;
                    }
                } else {
                    print_period(&period);
                    if *records {
                        println!();
                        print_records(&recs);
                    }
                }
            }
            PeriodAction::List => {
                let all = list_periods(&pool.conn)?;
                if cli.json {
                    print_json(&all)?;
                } else if all.is_empty() {
                    info("No periods defined.");
                } else {
                    for p in &all {
                        println!(
                            "{:>4}  {} → {}  {}{:<9}{}",
                            p.id.unwrap_or_default(),
                            p.start_date,
                            p.end_date,
                            color_for_status(p.status),
                            p.status.to_db_str(),
                            RESET
                        );
                    }
                }
            }
        }
    }
    Ok(())
}

pub(crate) fn print_period(p: &AttendancePeriod) {
    println!("📅 Period {}", p.label());
    println!(
        "   Status       : {}{}{}",
        color_for_status(p.status),
        p.status.to_db_str(),
        RESET
    );
    let dash = || "-".to_string();
    println!("   Created by   : {}", p.created_by.clone().unwrap_or_else(dash));
    println!("   Finalized by : {}", p.finalized_by.clone().unwrap_or_else(dash));
    println!("   Finalized at : {}", p.finalized_at.clone().unwrap_or_else(dash));
    if let Some(reason) = &p.unlock_reason {
        println!("   Last unlock  : {}", reason);
    }
}

fn print_records(recs: &[AttendanceRecord]) {
    if recs.is_empty() {
        println!("{}No records in this period.{}", GREY, RESET);
        return;
    }

    println!(
        "{:>5}  {:<10}  {:<12}  {:>5}  {:>5}  {:>6}  {:<10}  {}",
        "ID", "DATE", "EMPLOYEE", "IN", "OUT", "HOURS", "CONFLICT", "FINAL"
    );
    for r in recs {
        let hours = r
            .total_hours
            .map(|h| format!("{:.2}", h))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>5}  {:<10}  {:<12}  {:>5}  {:>5}  {:>6}  {}{:<10}{}  {}",
            r.id,
            r.date_str(),
            r.employee_id,
            r.clock_in_str(),
            r.clock_out_str(),
            hours,
            color_for_conflict(r.conflict),
            r.conflict.label(),
            RESET,
            if r.is_finalized { "yes" } else { "no" }
        );
    }
}
