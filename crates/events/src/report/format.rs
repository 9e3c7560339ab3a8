//! Report text rendering.
//!
//! Pure functions: the current instant and the clock are inputs, so a report
//! is fully determined by its arguments.

use std::collections::HashMap;

use sentry_core::clock::ReportClock;
use sentry_core::template::{render_body, render_title, TemplateVars};
use sentry_core::types::{DbId, Timestamp};
use sentry_db::models::issue::Issue;

use super::config::EffectiveReportConfig;

/// Branch label used when an issue points at a branch that no longer exists.
pub const UNKNOWN_BRANCH: &str = "Unknown Branch";

/// Rendered title and body of one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportContent {
    pub title: String,
    pub body: String,
}

/// Render one block per issue, in the given order.
pub fn format_issue_list(
    issues: &[Issue],
    branch_names: &HashMap<DbId, String>,
    clock: &ReportClock,
) -> String {
    issues
        .iter()
        .map(|issue| {
            let branch = branch_names
                .get(&issue.branch_id)
                .map(String::as_str)
                .unwrap_or(UNKNOWN_BRANCH);
            format!(
                "**🏢 Branch: {branch}**\n📊 Status: {status}\n🐛 Issue: {description}\n_(Opened: {opened})_\n\n",
                status = issue.status,
                description = issue.description,
                opened = clock.short_date(issue.opened_at),
            )
        })
        .collect()
}

/// Render the report for `party` from its open issues.
///
/// Custom templates in `config` replace the built-in title and body.
pub fn format_report(
    party: &str,
    issues: &[Issue],
    branch_names: &HashMap<DbId, String>,
    config: &EffectiveReportConfig,
    now: Timestamp,
    clock: &ReportClock,
) -> ReportContent {
    let issue_count = issues.len();
    let date = clock.report_date(now);
    let issue_list = format_issue_list(issues, branch_names, clock);
    let vars = TemplateVars {
        assignee: party,
        issue_count,
        date: &date,
        issue_list: &issue_list,
    };

    let title = match &config.report_title {
        Some(template) => render_title(template, &vars),
        None => format!("🚨 {issue_count} Open Issues Report for {party}"),
    };
    let body = match &config.report_body {
        Some(template) => render_body(template, &vars),
        None => format!(
            "**🚨 Daily Open Issues Report for {party} - {date}**\n\n\
             There are currently **{issue_count}** open or in-progress issues assigned to you.\n\n\
             ---\n\n\
             {issue_list}"
        ),
    };

    ReportContent { title, body }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sentry_core::issue_status::IssueStatus;
    use sentry_core::party::ResponsibleParty;

    fn now() -> Timestamp {
        // 21:30 UTC is already the next day in Nairobi.
        Utc.with_ymd_and_hms(2026, 3, 4, 21, 30, 0).unwrap()
    }

    fn issue(id: DbId, branch_id: DbId, description: &str, status: IssueStatus) -> Issue {
        let opened = Utc.with_ymd_and_hms(2026, 2, 27, 7, 0, 0).unwrap();
        Issue {
            id,
            branch_id,
            description: description.to_string(),
            opened_at: opened,
            responsibility: ResponsibleParty::Crdb,
            status,
            ticket_number: None,
            ticket_url: None,
            closing_date: None,
            created_at: opened,
            updated_at: opened,
        }
    }

    fn names() -> HashMap<DbId, String> {
        HashMap::from([(1, "Posta".to_string()), (2, "Samora".to_string())])
    }

    #[test]
    fn empty_report_has_zero_count_and_no_blocks() {
        let content = format_report(
            "CRDB",
            &[],
            &names(),
            &EffectiveReportConfig::default(),
            now(),
            &ReportClock::default(),
        );
        assert_eq!(content.title, "🚨 0 Open Issues Report for CRDB");
        assert!(content.body.contains("There are currently **0** open"));
        assert!(!content.body.contains("🏢 Branch"));
    }

    #[test]
    fn default_body_layout() {
        let issues = [issue(1, 1, "ATM offline", IssueStatus::Open)];
        let content = format_report(
            "CRDB",
            &issues,
            &names(),
            &EffectiveReportConfig::default(),
            now(),
            &ReportClock::default(),
        );
        assert_eq!(
            content.body,
            "**🚨 Daily Open Issues Report for CRDB - 05 Mar 2026**\n\n\
             There are currently **1** open or in-progress issues assigned to you.\n\n\
             ---\n\n\
             **🏢 Branch: Posta**\n📊 Status: Open\n🐛 Issue: ATM offline\n_(Opened: 27 Feb)_\n\n"
        );
    }

    #[test]
    fn one_block_per_issue_with_unknown_branch_fallback() {
        let issues = [
            issue(1, 1, "ATM offline", IssueStatus::Open),
            issue(2, 2, "Printer jam", IssueStatus::InProgress),
            issue(3, 99, "Orphan", IssueStatus::Open),
        ];
        let list = format_issue_list(&issues, &names(), &ReportClock::default());
        assert_eq!(list.matches("**🏢 Branch: ").count(), 3);
        assert!(list.contains("🐛 Issue: Printer jam"));
        assert!(list.contains("📊 Status: In Progress"));
        assert!(list.contains("**🏢 Branch: Unknown Branch**"));
    }

    #[test]
    fn custom_templates_substitute_every_token() {
        let config = EffectiveReportConfig {
            report_title: Some("{assignee}: {issueCount} ({assignee})".to_string()),
            report_body: Some("{date}|{issueCount}|{issueList}{issueList}".to_string()),
            ..Default::default()
        };
        let issues = [issue(1, 1, "ATM offline", IssueStatus::Open)];
        let content =
            format_report("Zaoma", &issues, &names(), &config, now(), &ReportClock::default());
        assert_eq!(content.title, "Zaoma: 1 (Zaoma)");
        assert!(content.body.starts_with("05 Mar 2026|1|**🏢 Branch: Posta**"));
        assert_eq!(content.body.matches("ATM offline").count(), 2);
    }
}
