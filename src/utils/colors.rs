/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

use crate::models::conflict_state::ConflictState;
use crate::models::period_status::PeriodStatus;

/// PENDING → yellow, FINALIZED → green, LOCKED → red.
pub fn color_for_status(status: PeriodStatus) -> &'static str {
    match status {
        PeriodStatus::Pending => YELLOW,
        PeriodStatus::Finalized => GREEN,
        PeriodStatus::Locked => RED,
    }
}

/// Confirmed → reset, rejected → red, still open → yellow.
pub fn color_for_conflict(state: ConflictState) -> &'static str {
    match state {
        ConflictState::ConfirmedResolved => RESET,
        ConflictState::RejectedResolution => RED,
        ConflictState::Unresolved => YELLOW,
    }
}

/// Grey for zero counters, red otherwise.
pub fn color_for_count(value: i64) -> &'static str {
    if value == 0 { GREY } else { RED }
}
