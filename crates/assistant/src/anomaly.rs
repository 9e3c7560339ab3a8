//! Anomaly summary for a single branch.

use std::fmt::Write;

use sentry_db::models::branch::Branch;
use sentry_db::models::issue::Issue;

use crate::chat::Assistant;
use crate::error::AssistantError;
use crate::model::{Content, GenerateRequest};
use crate::prompt::{ANOMALY_INSTRUCTIONS, NO_METRICS};

/// One line per issue, oldest first.
pub fn issue_history(issues: &[Issue]) -> String {
    let mut sorted: Vec<&Issue> = issues.iter().collect();
    sorted.sort_by_key(|issue| issue.opened_at);

    if sorted.is_empty() {
        return "No issues recorded.".to_string();
    }

    let mut out = String::new();
    for issue in sorted {
        let _ = write!(
            out,
            "- {} [{}] {}: {}",
            issue.opened_at.format("%Y-%m-%d"),
            issue.status,
            issue.responsibility,
            issue.description
        );
        if let Some(closed) = issue.closing_date {
            let _ = write!(out, " (closed {})", closed.format("%Y-%m-%d"));
        }
        out.push('\n');
    }
    out
}

pub fn anomaly_prompt(branch: &Branch, issues: &[Issue], metrics: Option<&str>) -> String {
    let metrics = metrics
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(NO_METRICS);
    format!(
        "{ANOMALY_INSTRUCTIONS}\n\nBranch: {} (code {})\nIssue history:\n{}\nSystem performance metrics: {}\n\nSummary:",
        branch.name,
        branch.code,
        issue_history(issues),
        metrics
    )
}

impl Assistant {
    /// Ask the model for a short anomaly summary of one branch. No tools.
    pub async fn summarize_anomalies(
        &self,
        branch: &Branch,
        issues: &[Issue],
        metrics: Option<&str>,
    ) -> Result<String, AssistantError> {
        let request = GenerateRequest {
            system_instruction: None,
            contents: vec![Content::user_text(anomaly_prompt(branch, issues, metrics))],
            tools: Vec::new(),
        };
        let response = self.model.generate(&request).await?;
        let summary = response.text.trim();
        if summary.is_empty() {
            return Err(AssistantError::InvalidResponse(
                "model returned an empty summary".into(),
            ));
        }
        Ok(summary.to_string())
    }
}
