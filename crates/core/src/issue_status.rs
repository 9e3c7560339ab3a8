//! Issue lifecycle status and the closing-date rule.
//!
//! Invariant: an issue carries a closing date iff its status is
//! [`IssueStatus::Resolved`]. The helpers below compute the closing-date
//! write for creates and updates so every store applies the same rule.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::field_update::FieldUpdate;
use crate::types::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum IssueStatus {
    Open,
    InProgress,
    Resolved,
}

impl IssueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueStatus::Open => "Open",
            IssueStatus::InProgress => "In Progress",
            IssueStatus::Resolved => "Resolved",
        }
    }

    /// Open and in-progress issues are the ones reported to their owners.
    pub fn is_unresolved(self) -> bool {
        !matches!(self, IssueStatus::Resolved)
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(IssueStatus::Open),
            "in progress" | "in_progress" | "in-progress" => Ok(IssueStatus::InProgress),
            "resolved" => Ok(IssueStatus::Resolved),
            other => Err(CoreError::Validation(format!(
                "Unknown issue status '{other}'. Expected one of: Open, In Progress, Resolved"
            ))),
        }
    }
}

impl TryFrom<String> for IssueStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IssueStatus> for &'static str {
    fn from(value: IssueStatus) -> Self {
        value.as_str()
    }
}

/// Closing date for a newly created issue.
pub fn closing_date_on_create(status: IssueStatus, now: Timestamp) -> Option<Timestamp> {
    (status == IssueStatus::Resolved).then_some(now)
}

/// Closing-date write for an update moving an issue from `previous` to `next`.
///
/// - into `Resolved` from anything else: stamp `now`
/// - `Resolved` to `Resolved`: keep the stored date
/// - any unresolved status: clear
pub fn closing_date_on_update(
    previous: IssueStatus,
    next: IssueStatus,
    now: Timestamp,
) -> FieldUpdate<Timestamp> {
    match (previous, next) {
        (IssueStatus::Resolved, IssueStatus::Resolved) => FieldUpdate::Unchanged,
        (_, IssueStatus::Resolved) => FieldUpdate::Set(now),
        (_, _) => FieldUpdate::Clear,
    }
}
