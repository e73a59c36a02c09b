use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueType {
    UnresolvedConflicts,
    PendingApprovals,
    MissingData,
}

impl IssueType {
    pub fn code(&self) -> &'static str {
        match self {
            IssueType::UnresolvedConflicts => "UNRESOLVED_CONFLICTS",
            IssueType::PendingApprovals => "PENDING_APPROVALS",
            IssueType::MissingData => "MISSING_DATA",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodIssue {
    #[serde(rename = "type")]
    pub kind: IssueType,
    pub message: String,
    pub count: i64,
}

/// Raw counters behind the issue list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IssueCounts {
    pub unresolved_conflicts: i64,
    pub pending_approvals: i64,
    pub missing_data: i64,
}

impl IssueCounts {
    pub fn is_clear(&self) -> bool {
        self.unresolved_conflicts == 0 && self.pending_approvals == 0 && self.missing_data == 0
    }

    /// One issue per non-zero counter, in a stable order.
    pub fn to_issues(self) -> Vec<PeriodIssue> {
        let mut out = Vec::new();

        if self.unresolved_conflicts > 0 {
            out.push(PeriodIssue {
                kind: IssueType::UnresolvedConflicts,
                message: format!(
                    "{} record(s) have conflicts that are not confirmed as resolved",
                    self.unresolved_conflicts
                ),
                count: self.unresolved_conflicts,
            });
        }
        if self.pending_approvals > 0 {
            out.push(PeriodIssue {
                kind: IssueType::PendingApprovals,
                message: format!(
                    "{} record(s) are still awaiting approval",
                    self.pending_approvals
                ),
                count: self.pending_approvals,
            });
        }
        if self.missing_data > 0 {
            out.push(PeriodIssue {
                kind: IssueType::MissingData,
                message: format!(
                    "{} record(s) have neither clock-in nor clock-out",
                    self.missing_data
                ),
                count: self.missing_data,
            });
        }

        out
    }
}
