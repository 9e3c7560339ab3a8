//! Report dispatcher runs against the in-memory store and a recording sender.

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use sentry_core::clock::ReportClock;
use sentry_core::issue_status::IssueStatus;
use sentry_core::notify::NotifyType;
use sentry_core::party::ResponsibleParty;
use sentry_core::types::{DbId, Timestamp};
use sentry_db::models::branch::CreateBranch;
use sentry_db::models::issue::CreateIssue;
use sentry_db::models::report_configuration::ReportConfiguration;
use sentry_db::{BranchStore, IssueStore, MemoryStore, ReportConfigStore};
use sentry_events::{
    DispatchError, DispatchMode, DispatchOutcome, RecordingSender, ReportDispatcher,
    SendFailurePolicy,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `hh:mm` in Nairobi (UTC+3).
fn nairobi(hour: u32, minute: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2026, 4, 14, hour - 3, minute, 0).unwrap()
}

struct Fixture {
    store: Arc<MemoryStore>,
    sender: Arc<RecordingSender>,
    branch_id: DbId,
}

impl Fixture {
    async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let branch_id = store
            .create_branch(&CreateBranch {
                code: "12".into(),
                name: "Posta".into(),
                ip_address: "10.0.0.12".into(),
            })
            .await
            .unwrap()
            .id;
        Self {
            store,
            sender: Arc::new(RecordingSender::new()),
            branch_id,
        }
    }

    fn dispatcher(&self, policy: SendFailurePolicy) -> ReportDispatcher {
        ReportDispatcher::new(
            self.store.clone(),
            self.sender.clone(),
            ReportClock::default(),
            policy,
        )
    }

    async fn issues(&self, party: ResponsibleParty, count: usize, status: IssueStatus) {
        for n in 0..count {
            let input = CreateIssue {
                branch_id: self.branch_id,
                description: format!("{party} issue {n}"),
                opened_at: None,
                responsibility: party,
                status: Some(status),
                ticket_number: None,
                ticket_url: None,
            };
            self.store
                .create_issue(&input.into_new(nairobi(8, 0)))
                .await
                .unwrap();
        }
    }

    async fn config(&self, id: &str, time: &str, enabled: bool) {
        self.store
            .upsert_report_configuration(&ReportConfiguration {
                id: id.to_string(),
                time: time.to_string(),
                enabled,
                report_title: None,
                report_body: None,
                channel: None,
                attach: None,
                notify_type: None,
                silent: None,
                updated_at: Utc::now(),
            })
            .await
            .unwrap();
    }
}

// ---------------------------------------------------------------------------
// Scheduled mode
// ---------------------------------------------------------------------------

async fn scheduled_fixture(wavetec_open: usize) -> Fixture {
    let fx = Fixture::new().await;
    fx.config("CRDB", "09:00", true).await;
    fx.config("Zaoma", "09:00", false).await;
    fx.config("Wavetec", "10:00", true).await;
    fx.issues(ResponsibleParty::Crdb, 1, IssueStatus::Open).await;
    fx.issues(ResponsibleParty::Zaoma, 2, IssueStatus::InProgress).await;
    fx.issues(ResponsibleParty::Wavetec, wavetec_open, IssueStatus::Open).await;
    fx.issues(ResponsibleParty::Wavetec, 1, IssueStatus::Resolved).await;
    fx
}

#[tokio::test]
async fn scheduled_sends_only_enabled_configs_due_now() {
    let fx = scheduled_fixture(1).await;
    let outcome = fx
        .dispatcher(SendFailurePolicy::Abort)
        .run_scheduled(nairobi(9, 0))
        .await
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::Sent { mode: DispatchMode::Scheduled, count: 1 });
    assert_eq!(outcome.message(), "Cron job finished. Sent 1 reports.");
    let sent = fx.sender.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "🚨 1 Open Issues Report for CRDB");
}

#[tokio::test]
async fn scheduled_at_ten_reports_wavetec_when_it_has_open_issues() {
    let fx = scheduled_fixture(3).await;
    let outcome = fx
        .dispatcher(SendFailurePolicy::Abort)
        .run_scheduled(nairobi(10, 0))
        .await
        .unwrap();
    assert_eq!(outcome.sent(), 1);
    assert_eq!(fx.sender.sent()[0].title, "🚨 3 Open Issues Report for Wavetec");
}

#[tokio::test]
async fn scheduled_at_ten_skips_wavetec_with_only_resolved_issues() {
    let fx = scheduled_fixture(0).await;
    let outcome = fx
        .dispatcher(SendFailurePolicy::Abort)
        .run_scheduled(nairobi(10, 0))
        .await
        .unwrap();
    assert_eq!(outcome.sent(), 0);
    assert!(fx.sender.sent().is_empty());
}

#[tokio::test]
async fn scheduled_other_minute_sends_nothing() {
    let fx = scheduled_fixture(1).await;
    let outcome = fx
        .dispatcher(SendFailurePolicy::Abort)
        .run_scheduled(nairobi(9, 1))
        .await
        .unwrap();
    assert_eq!(outcome.message(), "Cron job finished. Sent 0 reports.");
}

#[tokio::test]
async fn scheduled_without_open_issues_short_circuits() {
    let fx = Fixture::new().await;
    fx.config("CRDB", "09:00", true).await;
    fx.issues(ResponsibleParty::Crdb, 2, IssueStatus::Resolved).await;

    let outcome = fx
        .dispatcher(SendFailurePolicy::Abort)
        .run_scheduled(nairobi(9, 0))
        .await
        .unwrap();
    assert_eq!(outcome.message(), "Cron job ran. No open issues.");
    assert!(fx.sender.sent().is_empty());
}

#[tokio::test]
async fn default_config_row_is_never_scheduled_itself() {
    let fx = Fixture::new().await;
    fx.config("default", "09:00", true).await;
    fx.issues(ResponsibleParty::Crdb, 1, IssueStatus::Open).await;

    let outcome = fx
        .dispatcher(SendFailurePolicy::Abort)
        .run_scheduled(nairobi(9, 0))
        .await
        .unwrap();
    assert_eq!(outcome.sent(), 0);
}

// ---------------------------------------------------------------------------
// Manual mode
// ---------------------------------------------------------------------------

#[tokio::test]
async fn manual_sends_one_report_per_team_with_open_issues() {
    let fx = Fixture::new().await;
    fx.issues(ResponsibleParty::Crdb, 2, IssueStatus::Open).await;
    fx.issues(ResponsibleParty::Wavetec, 5, IssueStatus::InProgress).await;
    // Disabled and off-schedule: manual mode ignores both.
    fx.config("Wavetec", "23:59", false).await;

    let outcome = fx
        .dispatcher(SendFailurePolicy::Abort)
        .run_manual(nairobi(14, 0))
        .await
        .unwrap();

    assert_eq!(outcome.message(), "Manually triggered 2 report(s) successfully.");
    let titles: Vec<String> = fx.sender.sent().into_iter().map(|p| p.title).collect();
    assert_eq!(
        titles,
        vec![
            "🚨 2 Open Issues Report for CRDB".to_string(),
            "🚨 5 Open Issues Report for Wavetec".to_string(),
        ]
    );
}

#[tokio::test]
async fn manual_without_open_issues() {
    let fx = Fixture::new().await;
    let outcome = fx
        .dispatcher(SendFailurePolicy::Abort)
        .run_manual(nairobi(14, 0))
        .await
        .unwrap();
    assert_eq!(outcome.message(), "No teams had open issues to report.");
}

#[tokio::test]
async fn manual_uses_fallback_and_default_settings() {
    let fx = Fixture::new().await;
    fx.issues(ResponsibleParty::Zaoma, 1, IssueStatus::Open).await;

    fx.dispatcher(SendFailurePolicy::Abort)
        .run_manual(nairobi(14, 0))
        .await
        .unwrap();
    let payload = &fx.sender.sent()[0];
    assert_eq!(payload.channel, "telegram");
    assert_eq!(payload.notify_type, NotifyType::Info);
    assert!(!payload.silent);
    assert_eq!(payload.attach, None);

    fx.store
        .upsert_report_configuration(&ReportConfiguration {
            id: "default".into(),
            time: "08:00".into(),
            enabled: true,
            report_title: Some("{assignee} has {issueCount}".into()),
            report_body: None,
            channel: Some("ops-alerts".into()),
            attach: Some("https://cdn.example.com/logo.png".into()),
            notify_type: Some(NotifyType::Warning),
            silent: Some(true),
            updated_at: Utc::now(),
        })
        .await
        .unwrap();

    fx.dispatcher(SendFailurePolicy::Abort)
        .run_manual(nairobi(14, 0))
        .await
        .unwrap();
    let payload = &fx.sender.sent()[1];
    assert_eq!(payload.title, "Zaoma has 1");
    assert_eq!(payload.channel, "ops-alerts");
    assert_eq!(payload.notify_type, NotifyType::Warning);
    assert!(payload.silent);
    assert_eq!(payload.attach, Some(vec!["https://cdn.example.com/logo.png".to_string()]));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn store_failure_aborts_before_sending() {
    let fx = Fixture::new().await;
    fx.issues(ResponsibleParty::Crdb, 1, IssueStatus::Open).await;
    fx.store.set_unavailable(true);

    let result = fx.dispatcher(SendFailurePolicy::Abort).run_manual(nairobi(9, 0)).await;
    assert_matches!(result, Err(DispatchError::Store(_)));
    assert!(fx.sender.sent().is_empty());
}

#[tokio::test]
async fn abort_policy_stops_at_first_failure() {
    let fx = Fixture::new().await;
    fx.issues(ResponsibleParty::Crdb, 1, IssueStatus::Open).await;
    fx.issues(ResponsibleParty::Zaoma, 1, IssueStatus::Open).await;
    fx.sender.reject_titles_containing("CRDB");

    let result = fx.dispatcher(SendFailurePolicy::Abort).run_manual(nairobi(9, 0)).await;
    assert_matches!(
        result,
        Err(DispatchError::Send { party: ResponsibleParty::Crdb, .. })
    );
    assert!(fx.sender.sent().is_empty());
}

#[tokio::test]
async fn continue_policy_attempts_every_team() {
    let fx = Fixture::new().await;
    fx.issues(ResponsibleParty::Crdb, 1, IssueStatus::Open).await;
    fx.issues(ResponsibleParty::Zaoma, 1, IssueStatus::Open).await;
    fx.sender.reject_titles_containing("CRDB");

    let result = fx.dispatcher(SendFailurePolicy::Continue).run_manual(nairobi(9, 0)).await;
    assert_matches!(
        result,
        Err(DispatchError::PartialFailure { ref failed, sent: 1 }) if failed == &vec![ResponsibleParty::Crdb]
    );
    assert_eq!(fx.sender.sent().len(), 1);
    assert!(fx.sender.sent()[0].title.contains("Zaoma"));
}
