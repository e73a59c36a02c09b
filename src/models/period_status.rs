use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodStatus {
    Pending,
    Finalized,
    Locked,
}

impl PeriodStatus {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PeriodStatus::Pending => "PENDING",
            PeriodStatus::Finalized => "FINALIZED",
            PeriodStatus::Locked => "LOCKED",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(PeriodStatus::Pending),
            "FINALIZED" => Some(PeriodStatus::Finalized),
            "LOCKED" => Some(PeriodStatus::Locked),
            _ => None,
        }
    }

    /// FINALIZED and LOCKED periods freeze their records.
    pub fn is_closed(&self) -> bool {
        matches!(self, PeriodStatus::Finalized | PeriodStatus::Locked)
    }
}
