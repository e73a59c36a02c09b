use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    CreatePeriod,
    Finalize,
    Unlock,
    Edit,
    Resolve,
    Ingest,
}

impl AuditAction {
    pub const ALL: [AuditAction; 6] = [
        AuditAction::CreatePeriod,
        AuditAction::Finalize,
        AuditAction::Unlock,
        AuditAction::Edit,
        AuditAction::Resolve,
        AuditAction::Ingest,
    ];

    pub fn to_db_str(&self) -> &'static str {
        match self {
            AuditAction::CreatePeriod => "create_period",
            AuditAction::Finalize => "finalize",
            AuditAction::Unlock => "unlock",
            AuditAction::Edit => "edit",
            AuditAction::Resolve => "resolve",
            AuditAction::Ingest => "ingest",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "create_period" => Some(AuditAction::CreatePeriod),
            "finalize" => Some(AuditAction::Finalize),
            "unlock" => Some(AuditAction::Unlock),
            "edit" => Some(AuditAction::Edit),
            "resolve" => Some(AuditAction::Resolve),
            "ingest" => Some(AuditAction::Ingest),
            _ => None,
        }
    }

    /// Entity kind the action targets.
    pub fn entity(&self) -> &'static str {
        match self {
            AuditAction::CreatePeriod | AuditAction::Finalize | AuditAction::Unlock => "period",
            AuditAction::Edit | AuditAction::Resolve | AuditAction::Ingest => "record",
        }
    }
}

/// Append-only trail entry. Written in the same transaction as the change
/// it describes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub actor: String,
    pub action: AuditAction,
    pub entity_id: i64,
    pub before: String,
    pub after: String,
    pub created_at: String,
}
