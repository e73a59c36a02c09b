//! Unified application error type.
//! All modules (db, core, client, cli) return AppError so that every failure
//! can be classified into one of the four operator-facing kinds.

use crate::models::issue::PeriodIssue;
use serde::Serialize;
use std::fmt;
use std::io;
use thiserror::Error;

/// The four classes an operator (or a calling service) reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    ValidationFailed,
    SystemError,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::InvalidState => "INVALID_STATE",
            ErrorKind::ValidationFailed => "VALIDATION_FAILED",
            ErrorKind::SystemError => "SYSTEM_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Field a validation message is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditField {
    Date,
    ClockIn,
    ClockOut,
    Reason,
}

impl EditField {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditField::Date => "date",
            EditField::ClockIn => "clock_in",
            EditField::ClockOut => "clock_out",
            EditField::Reason => "reason",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: EditField,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: EditField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field.as_str(), self.message)
    }
}

fn join_violations(v: &[FieldViolation]) -> String {
    v.iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_issues(v: &[PeriodIssue]) -> String {
    v.iter()
        .map(|i| format!("{} ({})", i.message, i.count))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // Lifecycle
    // ---------------------------
    #[error("{entity} #{id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{0}")]
    InvalidState(String),

    // ---------------------------
    // Validation
    // ---------------------------
    #[error("Invalid edit: {}", join_violations(.0))]
    Validation(Vec<FieldViolation>),

    #[error("Period cannot be finalized: {}", join_issues(.0))]
    Precondition(Vec<PeriodIssue>),

    #[error("Range {start}..{end} overlaps period #{existing}")]
    Overlap {
        start: String,
        end: String,
        existing: i64,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("An actor id is required for this operation")]
    MissingActor,

    #[error("A non-empty reason is required")]
    MissingReason,

    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    // ---------------------------
    // System
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound { .. } => ErrorKind::NotFound,
            AppError::InvalidState(_) => ErrorKind::InvalidState,
            AppError::Validation(_)
            | AppError::Precondition(_)
            | AppError::Overlap { .. }
            | AppError::InvalidInput(_)
            | AppError::Duplicate(_)
            | AppError::MissingActor
            | AppError::MissingReason
            | AppError::InvalidDate(_)
            | AppError::InvalidTime(_)
            | AppError::InvalidRange(_) => ErrorKind::ValidationFailed,
            AppError::Io(_)
            | AppError::Db(_)
            | AppError::Migration(_)
            | AppError::Config(_)
            | AppError::Serialization(_)
            | AppError::Other(_) => ErrorKind::SystemError,
        }
    }

    /// Message safe to show to an operator. System failures are replaced by a
    /// generic line; their detail goes to the diagnostic log.
    pub fn operator_message(&self) -> String {
        match self.kind() {
            ErrorKind::SystemError => {
                "An unexpected error occurred; see the diagnostic log for details".to_string()
            }
            _ => self.to_string(),
        }
    }

    pub fn not_found_period(id: i64) -> Self {
        AppError::NotFound {
            entity: "Period",
            id,
        }
    }

    pub fn not_found_record(id: i64) -> Self {
        AppError::NotFound {
            entity: "Record",
            id,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
