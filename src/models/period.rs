use super::period_status::PeriodStatus;
use chrono::NaiveDate;
use serde::Serialize;

/// A date range subject to one finalize/unlock decision cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendancePeriod {
    /// `None` only for the transient projection returned by the summary
    /// calculator when no period exists yet for a range.
    pub id: Option<i64>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: PeriodStatus,
    pub finalized_by: Option<String>,
    pub finalized_at: Option<String>,
    pub unlock_reason: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Option<String>,
}

impl AttendancePeriod {
    pub fn projection(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: None,
            start_date,
            end_date,
            status: PeriodStatus::Pending,
            finalized_by: None,
            finalized_at: None,
            unlock_reason: None,
            created_by: None,
            created_at: None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn label(&self) -> String {
        match self.id {
            Some(id) => format!("#{} {} → {}", id, self.start_date, self.end_date),
            None => format!("(new) {} → {}", self.start_date, self.end_date),
        }
    }
}
