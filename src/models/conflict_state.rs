use serde::Serialize;

/// Conflict-resolution state of an attendance record.
///
/// Persisted as a nullable INTEGER (NULL / 0 / 1). Both `Unresolved` and
/// `RejectedResolution` block finalization, but they are reported separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConflictState {
    #[default]
    Unresolved,
    RejectedResolution,
    ConfirmedResolved,
}

impl ConflictState {
    /// Convert enum → DB value
    pub fn to_db(&self) -> Option<i64> {
        match self {
            ConflictState::Unresolved => None,
            ConflictState::RejectedResolution => Some(0),
            ConflictState::ConfirmedResolved => Some(1),
        }
    }

    /// Convert DB value → enum
    pub fn from_db(v: Option<i64>) -> Option<Self> {
        match v {
            None => Some(ConflictState::Unresolved),
            Some(0) => Some(ConflictState::RejectedResolution),
            Some(1) => Some(ConflictState::ConfirmedResolved),
            _ => None,
        }
    }

    /// Helper: parse CLI input
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "unresolved" | "pending" => Some(ConflictState::Unresolved),
            "rejected" => Some(ConflictState::RejectedResolution),
            "resolved" | "ok" => Some(ConflictState::ConfirmedResolved),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConflictState::Unresolved => "unresolved",
            ConflictState::RejectedResolution => "rejected",
            ConflictState::ConfirmedResolved => "resolved",
        }
    }
}
