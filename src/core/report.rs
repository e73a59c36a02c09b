//! Result object for finalize / unlock as handed to callers (`--json`).

use crate::core::finalize::TransitionOutcome;
use crate::errors::{AppError, AppResult, ErrorKind};
use crate::models::period::AttendancePeriod;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportError {
    pub code: &'static str,
    pub message: String,
}

impl ReportError {
    fn from_error(e: &AppError) -> Self {
        Self {
            code: e.kind().code(),
            message: e.operator_message(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<AttendancePeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected_record_count: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ReportError>,
}

impl OperationReport {
    pub fn from_result(result: &AppResult<TransitionOutcome>) -> Self {
        match result {
            Ok(o) => Self {
                success: true,
                period: Some(o.period.clone()),
                affected_record_count: Some(o.affected_records),
                errors: Vec::new(),
            },
            Err(e) => Self {
                success: false,
                period: None,
                affected_record_count: None,
                errors: Self::errors_for(e),
            },
        }
    }

    /// A failed precondition lists one entry per blocking issue.
    fn errors_for(e: &AppError) -> Vec<ReportError> {
        match e {
            AppError::Precondition(issues) => issues
                .iter()
                .map(|i| ReportError {
                    code: ErrorKind::ValidationFailed.code(),
                    message: format!("{}: {} ({})", i.kind.code(), i.message, i.count),
                })
                .collect(),
            other => vec![ReportError::from_error(other)],
        }
    }

    pub fn error_codes(&self) -> Vec<&'static str> {
        self.errors.iter().map(|e| e.code).collect()
    }
}
