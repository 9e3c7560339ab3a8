//! The closed set of tools exposed to the model.
//!
//! Raw `{name, args}` calls are parsed into [`ToolRequest`] before anything
//! runs. A call that fails to parse is answered with an error result so the
//! model can correct itself.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use sentry_core::dates::days_ago_iso;
use sentry_core::issue_status::IssueStatus;
use sentry_core::last_worked::{parse_ticket_rows, EMPTY_PAYLOAD_MESSAGE};
use sentry_core::party::ResponsibleParty;
use sentry_core::types::Timestamp;
use sentry_db::models::branch::Branch;
use sentry_db::models::issue::NewIssue;
use sentry_db::{apply_ticket_counts, Store};

use crate::model::{ToolCall, ToolDeclaration};

pub const GET_BRANCHES: &str = "getBranches";
pub const GET_ALL_ISSUES: &str = "getAllIssues";
pub const LOG_ISSUE: &str = "logIssue";
pub const GET_DATE_FROM_DAYS_AGO: &str = "getDateFromDaysAgo";
pub const UPDATE_LAST_WORKED: &str = "updateLastWorkedFromTicketData";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ToolArgsError {
    #[error("Unknown tool '{0}'")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: &'static str, reason: String },
}

/// A validated tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    GetBranches,
    GetAllIssues,
    LogIssue {
        branch_name: String,
        description: String,
        responsibility: ResponsibleParty,
    },
    GetDateFromDaysAgo {
        days: i64,
    },
    UpdateLastWorkedFromTicketData {
        branch_data: String,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogIssueArgs {
    branch_name: String,
    description: String,
    responsibility: ResponsibleParty,
}

#[derive(Deserialize)]
struct DaysAgoArgs {
    days: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TicketDataArgs {
    branch_data: String,
}

fn args<T: serde::de::DeserializeOwned>(
    tool: &'static str,
    raw: &Value,
) -> Result<T, ToolArgsError> {
    serde_json::from_value(raw.clone()).map_err(|e| ToolArgsError::InvalidArguments {
        tool,
        reason: e.to_string(),
    })
}

fn invalid(tool: &'static str, reason: &str) -> ToolArgsError {
    ToolArgsError::InvalidArguments {
        tool,
        reason: reason.to_string(),
    }
}

impl ToolRequest {
    pub fn parse(call: &ToolCall) -> Result<Self, ToolArgsError> {
        match call.name.as_str() {
            GET_BRANCHES => Ok(ToolRequest::GetBranches),
            GET_ALL_ISSUES => Ok(ToolRequest::GetAllIssues),
            LOG_ISSUE => {
                let a: LogIssueArgs = args(LOG_ISSUE, &call.args)?;
                let branch_name = a.branch_name.trim().to_string();
                let description = a.description.trim().to_string();
                if branch_name.is_empty() {
                    return Err(invalid(LOG_ISSUE, "branchName must not be empty"));
                }
                if description.is_empty() {
                    return Err(invalid(LOG_ISSUE, "description must not be empty"));
                }
                Ok(ToolRequest::LogIssue {
                    branch_name,
                    description,
                    responsibility: a.responsibility,
                })
            }
            GET_DATE_FROM_DAYS_AGO => {
                let a: DaysAgoArgs = args(GET_DATE_FROM_DAYS_AGO, &call.args)?;
                if !a.days.is_finite() {
                    return Err(invalid(GET_DATE_FROM_DAYS_AGO, "days must be a finite number"));
                }
                // Fractional days are truncated; saturating cast.
                Ok(ToolRequest::GetDateFromDaysAgo {
                    days: a.days.trunc() as i64,
                })
            }
            UPDATE_LAST_WORKED => {
                let a: TicketDataArgs = args(UPDATE_LAST_WORKED, &call.args)?;
                Ok(ToolRequest::UpdateLastWorkedFromTicketData {
                    branch_data: a.branch_data,
                })
            }
            other => Err(ToolArgsError::UnknownTool(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolRequest::GetBranches => GET_BRANCHES,
            ToolRequest::GetAllIssues => GET_ALL_ISSUES,
            ToolRequest::LogIssue { .. } => LOG_ISSUE,
            ToolRequest::GetDateFromDaysAgo { .. } => GET_DATE_FROM_DAYS_AGO,
            ToolRequest::UpdateLastWorkedFromTicketData { .. } => UPDATE_LAST_WORKED,
        }
    }
}

/// Declarations advertised to the model.
pub fn declarations() -> Vec<ToolDeclaration> {
    vec![
        ToolDeclaration {
            name: GET_BRANCHES,
            description: "Get a list of all bank branches.",
            parameters: json!({ "type": "object", "properties": {} }),
        },
        ToolDeclaration {
            name: GET_ALL_ISSUES,
            description: "Get a list of all issues across all branches.",
            parameters: json!({ "type": "object", "properties": {} }),
        },
        ToolDeclaration {
            name: LOG_ISSUE,
            description: "Log a new open issue against a branch.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "branchName": { "type": "string", "description": "Name of the branch." },
                    "description": { "type": "string", "description": "What is wrong." },
                    "responsibility": {
                        "type": "string",
                        "enum": ResponsibleParty::ALL.map(ResponsibleParty::as_str),
                        "description": "Team responsible for fixing the issue.",
                    },
                },
                "required": ["branchName", "description", "responsibility"],
            }),
        },
        ToolDeclaration {
            name: GET_DATE_FROM_DAYS_AGO,
            description: "Compute the date a number of days before now, for questions about \
                          time windows such as \"the last 7 days\".",
            parameters: json!({
                "type": "object",
                "properties": {
                    "days": { "type": "number", "description": "Days to go back from now." },
                },
                "required": ["days"],
            }),
        },
        ToolDeclaration {
            name: UPDATE_LAST_WORKED,
            description: "Update the last-worked status of branches from a ticket export. Use \
                          when the user supplies a JSON array of branch ticket counts.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "branchData": {
                        "type": "string",
                        "description": "JSON array of objects with \"name\" (string) and \
                                        \"totalTickets\" (number).",
                    },
                },
                "required": ["branchData"],
            }),
        },
    ]
}

// ---------------------------------------------------------------------------
// Branch name resolution
// ---------------------------------------------------------------------------

/// Find a branch by exact case-insensitive name, falling back to a unique
/// case-insensitive substring match.
pub fn resolve_branch<'a>(branches: &'a [Branch], name: &str) -> Result<&'a Branch, String> {
    let wanted = name.trim().to_lowercase();

    if let Some(exact) = branches.iter().find(|b| b.name.to_lowercase() == wanted) {
        return Ok(exact);
    }

    let partial: Vec<&Branch> = branches
        .iter()
        .filter(|b| b.name.to_lowercase().contains(&wanted))
        .collect();

    match partial.as_slice() {
        [only] => Ok(only),
        [] => Err(format!(
            "Error: Could not find a branch named '{}'. Please use one of the existing branch names.",
            name.trim()
        )),
        many => Err(format!(
            "Error: '{}' matches several branches ({}). Please use the full branch name.",
            name.trim(),
            many.iter().map(|b| b.name.as_str()).collect::<Vec<_>>().join(", ")
        )),
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Executes validated tool requests against the store.
///
/// Failures are reported to the model as `Error: ...` strings, never as Rust
/// errors, so one bad call does not end the conversation.
#[derive(Clone)]
pub struct ToolRunner {
    store: Arc<dyn Store>,
}

impl ToolRunner {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn run(&self, request: ToolRequest, now: Timestamp) -> Value {
        tracing::debug!(tool = request.name(), "Running assistant tool");
        match request {
            ToolRequest::GetBranches => match self.store.list_branches().await {
                Ok(branches) => json!(branches),
                Err(e) => {
                    tracing::error!(error = %e, "getBranches failed");
                    json!("Error: There was a problem reading the branches.")
                }
            },
            ToolRequest::GetAllIssues => match self.store.list_issues().await {
                Ok(issues) => json!(issues),
                Err(e) => {
                    tracing::error!(error = %e, "getAllIssues failed");
                    json!("Error: There was a problem reading the issues.")
                }
            },
            ToolRequest::LogIssue {
                branch_name,
                description,
                responsibility,
            } => json!(self.log_issue(&branch_name, description, responsibility, now).await),
            ToolRequest::GetDateFromDaysAgo { days } => match days_ago_iso(now, days) {
                Some(date) => json!(date),
                None => json!(format!("Error: {days} days ago is outside the supported date range.")),
            },
            ToolRequest::UpdateLastWorkedFromTicketData { branch_data } => {
                json!(self.update_last_worked(&branch_data, now).await)
            }
        }
    }

    async fn log_issue(
        &self,
        branch_name: &str,
        description: String,
        responsibility: ResponsibleParty,
        now: Timestamp,
    ) -> String {
        let branches = match self.store.list_branches().await {
            Ok(branches) => branches,
            Err(e) => {
                tracing::error!(error = %e, "logIssue could not list branches");
                return "Error: There was a problem logging the new issue.".to_string();
            }
        };
        let branch = match resolve_branch(&branches, branch_name) {
            Ok(branch) => branch,
            Err(message) => return message,
        };

        let issue = NewIssue {
            branch_id: branch.id,
            description,
            opened_at: now,
            responsibility,
            status: IssueStatus::Open,
            ticket_number: None,
            ticket_url: None,
            closing_date: None,
        };
        match self.store.create_issue(&issue).await {
            Ok(created) => {
                tracing::info!(issue_id = created.id, branch_id = branch.id, "Issue logged by assistant");
                format!("Successfully logged a new issue for the {} branch.", branch.name)
            }
            Err(e) => {
                tracing::error!(error = %e, branch_id = branch.id, "logIssue failed");
                "Error: There was a problem logging the new issue.".to_string()
            }
        }
    }

    async fn update_last_worked(&self, branch_data: &str, now: Timestamp) -> String {
        let Ok(payload) = serde_json::from_str::<Value>(branch_data) else {
            return "Error: The provided data is not a valid JSON string. Please provide the data \
                    in the correct JSON format."
                .to_string();
        };
        let Ok(rows) = parse_ticket_rows(&payload) else {
            return format!("Error: {EMPTY_PAYLOAD_MESSAGE}");
        };

        match apply_ticket_counts(&*self.store, &rows, now).await {
            Ok(count) => format!(
                "Successfully processed the JSON data. Updated the 'lastWorked' status for {count} branches."
            ),
            Err(e) => {
                tracing::error!(error = %e, "updateLastWorkedFromTicketData failed");
                "Error: There was a problem updating the branches.".to_string()
            }
        }
    }
}
