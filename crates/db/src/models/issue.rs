//! Issue entity models and DTOs.

use serde::{Deserialize, Serialize};
use sentry_core::field_update::FieldUpdate;
use sentry_core::issue_status::{closing_date_on_create, closing_date_on_update, IssueStatus};
use sentry_core::party::ResponsibleParty;
use sentry_core::types::{DbId, Timestamp};
use sqlx::FromRow;
use validator::Validate;

use super::{blank_or_url, not_blank};

/// Prefix given to the description of a cloned issue.
pub const CLONE_PREFIX: &str = "(Clone) ";

/// A row from the `issues` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    pub id: DbId,
    pub branch_id: DbId,
    pub description: String,
    pub opened_at: Timestamp,
    #[sqlx(try_from = "String")]
    pub responsibility: ResponsibleParty,
    #[sqlx(try_from = "String")]
    pub status: IssueStatus,
    pub ticket_number: Option<String>,
    pub ticket_url: Option<String>,
    pub closing_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Issue {
    /// Whether the issue references a ticket in the external system.
    pub fn has_ticket(&self) -> bool {
        self.ticket_number
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }

    /// Build the insert for a copy of this issue, reopened at `now`.
    pub fn clone_at(&self, now: Timestamp) -> NewIssue {
        NewIssue {
            branch_id: self.branch_id,
            description: format!("{CLONE_PREFIX}{}", self.description),
            opened_at: now,
            responsibility: self.responsibility,
            status: IssueStatus::Open,
            ticket_number: self.ticket_number.clone(),
            ticket_url: self.ticket_url.clone(),
            closing_date: None,
        }
    }
}

/// DTO for creating an issue. `opened_at` defaults to now, `status` to Open.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateIssue {
    pub branch_id: DbId,
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    pub opened_at: Option<Timestamp>,
    pub responsibility: ResponsibleParty,
    pub status: Option<IssueStatus>,
    pub ticket_number: Option<String>,
    #[validate(custom(function = "blank_or_url"))]
    pub ticket_url: Option<String>,
}

impl CreateIssue {
    /// Resolve defaults and the closing date against `now`.
    pub fn into_new(self, now: Timestamp) -> NewIssue {
        let status = self.status.unwrap_or(IssueStatus::Open);
        NewIssue {
            branch_id: self.branch_id,
            description: self.description.trim().to_string(),
            opened_at: self.opened_at.unwrap_or(now),
            responsibility: self.responsibility,
            status,
            ticket_number: super::non_blank(self.ticket_number),
            ticket_url: super::non_blank(self.ticket_url),
            closing_date: closing_date_on_create(status, now),
        }
    }
}

/// Fully resolved insert for the `issues` table.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIssue {
    pub branch_id: DbId,
    pub description: String,
    pub opened_at: Timestamp,
    pub responsibility: ResponsibleParty,
    pub status: IssueStatus,
    pub ticket_number: Option<String>,
    pub ticket_url: Option<String>,
    pub closing_date: Option<Timestamp>,
}

/// DTO for updating an issue. Ticket fields can be explicitly cleared.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateIssue {
    pub branch_id: Option<DbId>,
    #[validate(custom(function = "not_blank"))]
    pub description: Option<String>,
    pub opened_at: Option<Timestamp>,
    pub responsibility: Option<ResponsibleParty>,
    pub status: Option<IssueStatus>,
    #[serde(default)]
    pub ticket_number: FieldUpdate<String>,
    #[serde(default)]
    pub ticket_url: FieldUpdate<String>,
}

impl UpdateIssue {
    /// Trim the patch. `now` becomes the closing date if the stored row
    /// turns out to be entering `Resolved`.
    ///
    /// Blank ticket values count as a clear.
    pub fn into_changes(self, now: Timestamp) -> IssueChanges {
        IssueChanges {
            branch_id: self.branch_id,
            description: self.description.map(|d| d.trim().to_string()),
            opened_at: self.opened_at,
            responsibility: self.responsibility,
            status: self.status,
            ticket_number: blank_is_clear(self.ticket_number),
            ticket_url: blank_is_clear(self.ticket_url),
            resolved_at: now,
        }
    }
}

fn blank_is_clear(update: FieldUpdate<String>) -> FieldUpdate<String> {
    match update {
        FieldUpdate::Set(v) if v.trim().is_empty() => FieldUpdate::Clear,
        FieldUpdate::Set(v) => FieldUpdate::Set(v.trim().to_string()),
        other => other,
    }
}

/// Fully resolved patch for the `issues` table.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueChanges {
    pub branch_id: Option<DbId>,
    pub description: Option<String>,
    pub opened_at: Option<Timestamp>,
    pub responsibility: Option<ResponsibleParty>,
    pub status: Option<IssueStatus>,
    pub ticket_number: FieldUpdate<String>,
    pub ticket_url: FieldUpdate<String>,
    /// Stamped as the closing date when the row moves into `Resolved`.
    pub resolved_at: Timestamp,
}

impl IssueChanges {
    /// Apply the patch to an in-memory copy of the row.
    ///
    /// The closing date is decided from the row's status at apply time,
    /// not from whatever status the caller read earlier.
    pub fn apply_to(self, issue: &mut Issue, now: Timestamp) {
        let previous = issue.status;
        if let Some(branch_id) = self.branch_id {
            issue.branch_id = branch_id;
        }
        if let Some(description) = self.description {
            issue.description = description;
        }
        if let Some(opened_at) = self.opened_at {
            issue.opened_at = opened_at;
        }
        if let Some(responsibility) = self.responsibility {
            issue.responsibility = responsibility;
        }
        if let Some(status) = self.status {
            issue.status = status;
        }
        issue.ticket_number = self.ticket_number.apply(issue.ticket_number.take());
        issue.ticket_url = self.ticket_url.apply(issue.ticket_url.take());
        issue.closing_date = closing_date_on_update(previous, issue.status, self.resolved_at)
            .apply(issue.closing_date.take());
        issue.updated_at = now;
    }
}

/// Query filters for listing issues.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFilter {
    pub status: Option<IssueStatus>,
    pub responsibility: Option<ResponsibleParty>,
    pub branch_id: Option<DbId>,
}

impl IssueFilter {
    pub fn matches(&self, issue: &Issue) -> bool {
        self.status.is_none_or(|s| s == issue.status)
            && self.responsibility.is_none_or(|r| r == issue.responsibility)
            && self.branch_id.is_none_or(|b| b == issue.branch_id)
    }
}
