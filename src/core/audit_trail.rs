use crate::db::audit;
use crate::errors::{AppError, AppResult};
use crate::models::audit::{AuditAction, AuditEntry};
use ansi_term::Colour;
use regex::Regex;
use rusqlite::Connection;

const SUMMARY_WIDTH: usize = 60;

fn ansi_pattern() -> AppResult<Regex> {
    Regex::new(r"\x1B\[[0-9;]*[mK]").map_err(|e| AppError::Other(e.to_string()))
}

fn strip_ansi(re: &Regex, s: &str) -> String {
    re.replace_all(s, "").into_owned()
}

fn color_for_action(action: AuditAction) -> Colour {
    match action {
        AuditAction::CreatePeriod => Colour::Cyan,
        AuditAction::Finalize => Colour::Green,
        AuditAction::Unlock => Colour::Red,
        AuditAction::Edit => Colour::Yellow,
        AuditAction::Resolve => Colour::Purple,
        AuditAction::Ingest => Colour::White,
    }
}

/// Trail entries, optionally narrowed to one entity (`"period"` / `"record"`).
pub fn audit_trail(conn: &Connection, entity: Option<(&str, i64)>) -> AppResult<Vec<AuditEntry>> {
    match entity {
        Some((kind, id)) => audit::load_for_entity(conn, kind, id),
        None => audit::load_all(conn),
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

pub fn print_trail(entries: &[AuditEntry]) -> AppResult<()> {
    if entries.is_empty() {
        println!("📜 Audit trail is empty.");
        return Ok(());
    }

    let re = ansi_pattern()?;

    let id_w = entries
        .iter()
        .map(|e| e.id.to_string().len())
        .max()
        .unwrap_or(1);
    let date_w = entries.iter().map(|e| e.created_at.len()).max().unwrap_or(10);
    let actor_w = entries.iter().map(|e| e.actor.len()).max().unwrap_or(5);

    println!("📜 Audit trail:\n");

    for e in entries {
        let color = color_for_action(e.action);
        let target = format!(
            "{} {} #{}",
            color.paint(e.action.to_db_str()),
            e.action.entity(),
            e.entity_id
        );
        let visible = strip_ansi(&re, &target);
        let padding = " ".repeat(24usize.saturating_sub(visible.len()));

        let after = if e.after.is_empty() { "-" } else { e.after.as_str() };

        println!(
            "{:>id_w$}: {:<date_w$} | {:<actor_w$} | {}{} => {}",
            e.id,
            e.created_at,
            e.actor,
            target,
            padding,
            truncate(after, SUMMARY_WIDTH),
            id_w = id_w,
            date_w = date_w,
            actor_w = actor_w,
        );
    }

    Ok(())
}
