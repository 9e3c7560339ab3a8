//! PostgreSQL store tests. These need a live database (`DATABASE_URL`) and
//! are ignored by default: `cargo test -p sentry-db -- --ignored`.

use assert_matches::assert_matches;
use chrono::Utc;
use sentry_core::error::CoreError;
use sentry_core::issue_status::IssueStatus;
use sentry_core::notify::NotifyType;
use sentry_core::party::ResponsibleParty;
use sentry_core::stock::SparePartLogType;
use sentry_db::models::branch::CreateBranch;
use sentry_db::models::issue::{CreateIssue, UpdateIssue};
use sentry_db::models::report_configuration::UpsertReportConfiguration;
use sentry_db::models::spare_part::{CreateSparePart, CreateSparePartLog};
use sentry_db::{
    BranchStore, IssueStore, PgStore, ReportConfigStore, SparePartStore, Store, StoreError,
};
use sqlx::PgPool;

fn new_branch(name: &str) -> CreateBranch {
    CreateBranch {
        code: "101".to_string(),
        name: name.to_string(),
        ip_address: "10.20.30.40".to_string(),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn test_health_check(pool: PgPool) {
    sentry_db::health_check(&pool).await.unwrap();
    PgStore::new(pool).ping().await.unwrap();
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn test_issue_closing_date_round_trip(pool: PgPool) {
    let store = PgStore::new(pool);
    let branch = store.create_branch(&new_branch("Posta")).await.unwrap();
    let now = Utc::now();
    let issue = store
        .create_issue(
            &CreateIssue {
                branch_id: branch.id,
                description: "Queue display blank".to_string(),
                opened_at: None,
                responsibility: ResponsibleParty::Wavetec,
                status: Some(IssueStatus::InProgress),
                ticket_number: Some("WT-1".to_string()),
                ticket_url: None,
            }
            .into_new(now),
        )
        .await
        .unwrap();
    assert_eq!(issue.closing_date, None);

    let resolve = UpdateIssue {
        status: Some(IssueStatus::Resolved),
        ..Default::default()
    };
    let resolved = store
        .update_issue(issue.id, resolve.into_changes(now))
        .await
        .unwrap();
    assert_eq!(resolved.status, IssueStatus::Resolved);
    assert!(resolved.closing_date.is_some());
    assert_eq!(resolved.ticket_number.as_deref(), Some("WT-1"));

    // An edit prepared before the resolve must neither clear the date nor
    // trip the closing-date check.
    let edit = UpdateIssue {
        description: Some("Queue display flickers".to_string()),
        ..Default::default()
    };
    let edited = store.update_issue(issue.id, edit.into_changes(now)).await.unwrap();
    assert_eq!(edited.status, IssueStatus::Resolved);
    assert_eq!(edited.closing_date, resolved.closing_date);

    let reopen = UpdateIssue {
        status: Some(IssueStatus::Open),
        ..Default::default()
    };
    let reopened = store.update_issue(issue.id, reopen.into_changes(now)).await.unwrap();
    assert_eq!(reopened.closing_date, None);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn test_branch_delete_cascades(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let branch = store.create_branch(&new_branch("Samora")).await.unwrap();
    let part = store
        .create_spare_part(&CreateSparePart {
            name: "PSU".to_string(),
            part_number: None,
            quantity: 1,
            description: None,
        })
        .await
        .unwrap();
    store
        .record_spare_part_log(
            &CreateSparePartLog {
                branch_id: branch.id,
                spare_part_id: part.id,
                log_type: SparePartLogType::Replaced,
                quantity: 1,
                logged_at: None,
                notes: None,
            }
            .into_new(Utc::now()),
        )
        .await
        .unwrap();

    store.delete_branch(branch.id).await.unwrap();

    let remaining: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM spare_part_logs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining.0, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn test_overdraw_rolls_back(pool: PgPool) {
    let store = PgStore::new(pool);
    let branch = store.create_branch(&new_branch("Mbezi")).await.unwrap();
    let part = store
        .create_spare_part(&CreateSparePart {
            name: "Card reader".to_string(),
            part_number: None,
            quantity: 1,
            description: None,
        })
        .await
        .unwrap();

    let result = store
        .record_spare_part_log(
            &CreateSparePartLog {
                branch_id: branch.id,
                spare_part_id: part.id,
                log_type: SparePartLogType::Replaced,
                quantity: 2,
                logged_at: None,
                notes: None,
            }
            .into_new(Utc::now()),
        )
        .await;

    assert_matches!(result, Err(StoreError::Core(CoreError::Conflict(_))));
    assert_eq!(store.get_spare_part(part.id).await.unwrap().quantity, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn test_report_configuration_upsert(pool: PgPool) {
    let store = PgStore::new(pool);
    let dto: UpsertReportConfiguration = serde_json::from_value(serde_json::json!({
        "time": "08:15",
        "notify_type": "warning",
        "attach": "https://example.com/logo.png"
    }))
    .unwrap();
    let saved = store
        .upsert_report_configuration(&dto.into_configuration("CRDB".to_string(), Utc::now()))
        .await
        .unwrap();
    assert_eq!(saved.notify_type, Some(NotifyType::Warning));

    let loaded = store.get_report_configuration("CRDB").await.unwrap();
    assert_eq!(loaded.time, "08:15");
    assert!(loaded.enabled);
}
