//! Behaviour of the in-memory store: cascades, closing dates, and the
//! stock-adjusting usage log.

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use sentry_core::error::CoreError;
use sentry_core::issue_status::IssueStatus;
use sentry_core::last_worked::{parse_ticket_rows, LastWorkedUpdate};
use sentry_core::party::ResponsibleParty;
use sentry_core::stock::SparePartLogType;
use sentry_core::types::{DbId, Timestamp};
use sentry_db::models::branch::{CreateBranch, UpdateBranch};
use sentry_db::models::issue::{CreateIssue, UpdateIssue};
use sentry_db::models::spare_part::{CreateSparePart, CreateSparePartLog, SparePartLogFilter};
use sentry_db::models::user::NewUser;
use sentry_db::{
    apply_ticket_counts, BranchStore, IssueStore, MemoryStore, SparePartStore, Store, StoreError, UserStore,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn at(hour: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2026, 6, 1, hour, 0, 0).unwrap()
}

async fn branch(store: &MemoryStore, name: &str) -> DbId {
    store
        .create_branch(&CreateBranch {
            code: format!("{}", name.len()),
            name: name.to_string(),
            ip_address: "10.1.1.1".to_string(),
        })
        .await
        .unwrap()
        .id
}

async fn part(store: &MemoryStore, quantity: i32) -> DbId {
    store
        .create_spare_part(&CreateSparePart {
            name: "Receipt printer".to_string(),
            part_number: Some("RP-80".to_string()),
            quantity,
            description: None,
        })
        .await
        .unwrap()
        .id
}

fn movement(branch_id: DbId, spare_part_id: DbId, log_type: SparePartLogType, quantity: i32) -> CreateSparePartLog {
    CreateSparePartLog {
        branch_id,
        spare_part_id,
        log_type,
        quantity,
        logged_at: None,
        notes: None,
    }
}

fn open_issue(branch_id: DbId, description: &str) -> CreateIssue {
    CreateIssue {
        branch_id,
        description: description.to_string(),
        opened_at: Some(at(8)),
        responsibility: ResponsibleParty::Wavetec,
        status: None,
        ticket_number: None,
        ticket_url: None,
    }
}

// ---------------------------------------------------------------------------
// Branches and issues
// ---------------------------------------------------------------------------

#[tokio::test]
async fn deleting_branch_cascades_to_issues_and_logs() {
    let store = MemoryStore::new();
    let doomed = branch(&store, "Posta").await;
    let kept = branch(&store, "Samora").await;
    let part_id = part(&store, 5).await;

    store.create_issue(&open_issue(doomed, "UPS beeping").into_new(at(8))).await.unwrap();
    store.create_issue(&open_issue(kept, "Slow link").into_new(at(8))).await.unwrap();
    store
        .record_spare_part_log(&movement(doomed, part_id, SparePartLogType::Replaced, 1).into_new(at(9)))
        .await
        .unwrap();

    store.delete_branch(doomed).await.unwrap();

    let issues = store.list_issues().await.unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].branch_id, kept);
    let logs = store.list_spare_part_logs(SparePartLogFilter::default()).await.unwrap();
    assert!(logs.is_empty());
    assert_matches!(
        store.get_branch(doomed).await,
        Err(StoreError::Core(CoreError::NotFound { entity: "Branch", .. }))
    );
}

#[tokio::test]
async fn issue_for_missing_branch_is_not_found() {
    let store = MemoryStore::new();
    let result = store.create_issue(&open_issue(404, "Ghost").into_new(at(8))).await;
    assert_matches!(result, Err(StoreError::Core(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn closing_date_follows_status() {
    let store = MemoryStore::new();
    let branch_id = branch(&store, "Mwenge").await;
    let issue = store.create_issue(&open_issue(branch_id, "Teller PC down").into_new(at(8))).await.unwrap();

    let resolve = UpdateIssue {
        status: Some(IssueStatus::Resolved),
        ..Default::default()
    };
    let resolved = store
        .update_issue(issue.id, resolve.into_changes(at(10)))
        .await
        .unwrap();
    assert_eq!(resolved.closing_date, Some(at(10)));

    let reopen = UpdateIssue {
        status: Some(IssueStatus::Open),
        ..Default::default()
    };
    let reopened = store
        .update_issue(issue.id, reopen.into_changes(at(11)))
        .await
        .unwrap();
    assert_eq!(reopened.closing_date, None);
}

#[tokio::test]
async fn stale_edit_does_not_clear_a_fresh_closing_date() {
    let store = MemoryStore::new();
    let branch_id = branch(&store, "Mlimani").await;
    let issue = store.create_issue(&open_issue(branch_id, "Cash recycler").into_new(at(8))).await.unwrap();

    // Both patches are built while the issue is still Open.
    let resolve = UpdateIssue {
        status: Some(IssueStatus::Resolved),
        ..Default::default()
    }
    .into_changes(at(10));
    let edit = UpdateIssue {
        description: Some("Cash recycler jammed".into()),
        ..Default::default()
    }
    .into_changes(at(10));

    store.update_issue(issue.id, resolve).await.unwrap();
    let after = store.update_issue(issue.id, edit).await.unwrap();
    assert_eq!(after.status, IssueStatus::Resolved);
    assert_eq!(after.closing_date, Some(at(10)));
    assert_eq!(after.description, "Cash recycler jammed");
}

#[tokio::test]
async fn mark_worked_only_touches_listed_branches() {
    let store = MemoryStore::new();
    let worked = branch(&store, "Kariakoo").await;
    let idle = branch(&store, "Ubungo").await;

    let touched = store
        .mark_branches_worked(
            &[
                LastWorkedUpdate { branch_id: worked, total_tickets: 4 },
                LastWorkedUpdate { branch_id: 999, total_tickets: 1 },
            ],
            at(12),
        )
        .await
        .unwrap();

    assert_eq!(touched, 1);
    let worked = store.get_branch(worked).await.unwrap();
    assert_eq!(worked.last_worked, Some(at(12)));
    assert_eq!(worked.total_tickets, Some(4));
    assert_eq!(store.get_branch(idle).await.unwrap().last_worked, None);
}

#[tokio::test]
async fn ticket_counts_stamp_matching_branches_only() {
    let store = MemoryStore::new();
    let busy = branch(&store, "Mlimani City").await;
    let quiet = branch(&store, "Tarime").await;

    let rows = parse_ticket_rows(&serde_json::json!([
        {"name": "  mlimani city ", "totalTickets": 3},
        {"name": "Tarime", "totalTickets": 0},
        {"name": "Nowhere", "totalTickets": 9},
    ]))
    .unwrap();
    let applied = apply_ticket_counts(&store, &rows, at(15)).await.unwrap();

    assert_eq!(applied, 1);
    let busy = store.get_branch(busy).await.unwrap();
    assert_eq!(busy.last_worked, Some(at(15)));
    assert_eq!(busy.total_tickets, Some(3));
    assert_eq!(store.get_branch(quiet).await.unwrap().last_worked, None);
}

#[tokio::test]
async fn update_branch_can_clear_last_worked() {
    let store = MemoryStore::new();
    let id = branch(&store, "Kijitonyama").await;
    store
        .mark_branches_worked(&[LastWorkedUpdate { branch_id: id, total_tickets: 2 }], at(7))
        .await
        .unwrap();

    let update: UpdateBranch = serde_json::from_str(r#"{"last_worked": null}"#).unwrap();
    let branch = store.update_branch(id, &update).await.unwrap();
    assert_eq!(branch.last_worked, None);
    assert_eq!(branch.total_tickets, Some(2));
}

// ---------------------------------------------------------------------------
// Stock
// ---------------------------------------------------------------------------

#[tokio::test]
async fn overdraw_is_rejected_and_stock_unchanged() {
    let store = MemoryStore::new();
    let branch_id = branch(&store, "Mbezi").await;
    let part_id = part(&store, 2).await;

    let result = store
        .record_spare_part_log(&movement(branch_id, part_id, SparePartLogType::Replaced, 3).into_new(at(9)))
        .await;

    assert_matches!(result, Err(StoreError::Core(CoreError::Conflict(_))));
    assert_eq!(store.get_spare_part(part_id).await.unwrap().quantity, 2);
    assert!(store
        .list_spare_part_logs(SparePartLogFilter::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn return_always_succeeds_and_copies_part_name() {
    let store = MemoryStore::new();
    let branch_id = branch(&store, "Tegeta").await;
    let part_id = part(&store, 0).await;

    let (log, part) = store
        .record_spare_part_log(&movement(branch_id, part_id, SparePartLogType::Returned, 4).into_new(at(9)))
        .await
        .unwrap();

    assert_eq!(part.quantity, 4);
    assert_eq!(log.spare_part_name, "Receipt printer");
    assert_eq!(log.logged_at, at(9));
}

#[tokio::test]
async fn concurrent_movements_converge() {
    let store = Arc::new(MemoryStore::new());
    let branch_id = branch(&store, "Arusha").await;
    let part_id = part(&store, 20).await;

    let mut handles = Vec::new();
    for i in 0..40 {
        let store = Arc::clone(&store);
        let log_type = if i % 2 == 0 {
            SparePartLogType::Replaced
        } else {
            SparePartLogType::Returned
        };
        handles.push(tokio::spawn(async move {
            store
                .record_spare_part_log(&movement(branch_id, part_id, log_type, 1).into_new(at(9)))
                .await
                .map(|(_, part)| part.quantity)
        }));
    }

    for handle in handles {
        let quantity = handle.await.unwrap().unwrap();
        assert!(quantity >= 0);
    }

    // 20 replacements and 20 returns of one unit each.
    assert_eq!(store.get_spare_part(part_id).await.unwrap().quantity, 20);
    let logs = store
        .list_spare_part_logs(SparePartLogFilter { branch_id: Some(branch_id), spare_part_id: None })
        .await
        .unwrap();
    assert_eq!(logs.len(), 40);
}

#[tokio::test]
async fn concurrent_overdraws_never_go_negative() {
    let store = Arc::new(MemoryStore::new());
    let branch_id = branch(&store, "Dodoma").await;
    let part_id = part(&store, 3).await;

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .record_spare_part_log(
                        &movement(branch_id, part_id, SparePartLogType::Replaced, 1).into_new(at(9)),
                    )
                    .await
                    .is_ok()
            })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        if handle.await.unwrap() {
            succeeded += 1;
        }
    }

    assert_eq!(succeeded, 3);
    assert_eq!(store.get_spare_part(part_id).await.unwrap().quantity, 0);
}

// ---------------------------------------------------------------------------
// Users and availability
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_email_is_conflict_regardless_of_case() {
    let store = MemoryStore::new();
    let user = NewUser {
        email: "ops@bank.example".to_string(),
        display_name: "Ops".to_string(),
        password_hash: "hash".to_string(),
        role: "admin".to_string(),
    };
    store.create_user(&user).await.unwrap();

    let shouting = NewUser {
        email: "OPS@bank.example".to_string(),
        ..user
    };
    assert_matches!(
        store.create_user(&shouting).await,
        Err(StoreError::Core(CoreError::Conflict(_)))
    );
    assert!(store.find_user_by_email("Ops@Bank.Example").await.unwrap().is_some());
}

#[tokio::test]
async fn unavailable_store_fails_every_call() {
    let store = MemoryStore::new();
    store.set_unavailable(true);
    assert!(store.ping().await.is_err());
    assert!(store.list_branches().await.is_err());
    store.set_unavailable(false);
    assert!(store.ping().await.is_ok());
}
