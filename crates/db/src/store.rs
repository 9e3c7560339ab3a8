//! Store traits.
//!
//! Services receive an `Arc<dyn Store>` and never see which backend sits
//! behind it. Missing rows surface as `CoreError::NotFound`; stock conflicts
//! as `CoreError::Conflict`.

use async_trait::async_trait;
use sentry_core::last_worked::{plan_last_worked_updates, LastWorkedUpdate, TicketCountRow};
use sentry_core::types::{DbId, Timestamp};

use crate::error::StoreError;
use crate::models::branch::{Branch, CreateBranch, UpdateBranch};
use crate::models::issue::{Issue, IssueChanges, NewIssue};
use crate::models::report_configuration::ReportConfiguration;
use crate::models::spare_part::{
    CreateSparePart, NewSparePartLog, SparePart, SparePartLog, SparePartLogFilter,
    UpdateSparePart,
};
use crate::models::user::{NewUser, User};

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait BranchStore: Send + Sync {
    async fn list_branches(&self) -> StoreResult<Vec<Branch>>;

    async fn get_branch(&self, id: DbId) -> StoreResult<Branch>;

    async fn create_branch(&self, input: &CreateBranch) -> StoreResult<Branch>;

    /// Insert all rows or none.
    async fn import_branches(&self, inputs: &[CreateBranch]) -> StoreResult<Vec<Branch>>;

    async fn update_branch(&self, id: DbId, input: &UpdateBranch) -> StoreResult<Branch>;

    /// Remove a branch together with its issues and usage logs.
    async fn delete_branch(&self, id: DbId) -> StoreResult<()>;

    /// Stamp each branch with `at` and its ticket count. Returns how many rows
    /// were touched.
    async fn mark_branches_worked(
        &self,
        updates: &[LastWorkedUpdate],
        at: Timestamp,
    ) -> StoreResult<usize>;
}

#[async_trait]
pub trait IssueStore: Send + Sync {
    /// All issues, newest first.
    async fn list_issues(&self) -> StoreResult<Vec<Issue>>;

    async fn list_branch_issues(&self, branch_id: DbId) -> StoreResult<Vec<Issue>>;

    async fn get_issue(&self, id: DbId) -> StoreResult<Issue>;

    /// Insert an issue; the branch must exist.
    async fn create_issue(&self, input: &NewIssue) -> StoreResult<Issue>;

    async fn update_issue(&self, id: DbId, changes: IssueChanges) -> StoreResult<Issue>;

    async fn delete_issue(&self, id: DbId) -> StoreResult<()>;
}

#[async_trait]
pub trait SparePartStore: Send + Sync {
    async fn list_spare_parts(&self) -> StoreResult<Vec<SparePart>>;

    async fn get_spare_part(&self, id: DbId) -> StoreResult<SparePart>;

    async fn create_spare_part(&self, input: &CreateSparePart) -> StoreResult<SparePart>;

    async fn update_spare_part(&self, id: DbId, input: &UpdateSparePart)
        -> StoreResult<SparePart>;

    async fn delete_spare_part(&self, id: DbId) -> StoreResult<()>;

    /// Logs matching the filter, newest first.
    async fn list_spare_part_logs(
        &self,
        filter: SparePartLogFilter,
    ) -> StoreResult<Vec<SparePartLog>>;

    /// Insert a log and apply its stock movement as one atomic step.
    async fn record_spare_part_log(
        &self,
        input: &NewSparePartLog,
    ) -> StoreResult<(SparePartLog, SparePart)>;
}

#[async_trait]
pub trait ReportConfigStore: Send + Sync {
    async fn list_report_configurations(&self) -> StoreResult<Vec<ReportConfiguration>>;

    async fn get_report_configuration(&self, id: &str) -> StoreResult<ReportConfiguration>;

    async fn upsert_report_configuration(
        &self,
        config: &ReportConfiguration,
    ) -> StoreResult<ReportConfiguration>;

    async fn delete_report_configuration(&self, id: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>>;

    /// Case-insensitive lookup.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Insert a user; a duplicate email is a conflict.
    async fn create_user(&self, input: &NewUser) -> StoreResult<User>;
}

/// Everything the services need from persistence.
#[async_trait]
pub trait Store: BranchStore + IssueStore + SparePartStore + ReportConfigStore + UserStore {
    /// Whether the backend is reachable.
    async fn ping(&self) -> StoreResult<()>;
}

/// Match ticket-export rows against the current branches and stamp the hits
/// with `at`. Returns the number of applied rows.
pub async fn apply_ticket_counts<S: BranchStore + ?Sized>(
    store: &S,
    rows: &[TicketCountRow],
    at: Timestamp,
) -> StoreResult<usize> {
    let branches = store.list_branches().await?;
    let updates =
        plan_last_worked_updates(rows, branches.iter().map(|b| (b.id, b.name.as_str())));
    if updates.is_empty() {
        return Ok(0);
    }
    store.mark_branches_worked(&updates, at).await?;
    tracing::info!(applied = updates.len(), "Branch last-worked stamps applied");
    Ok(updates.len())
}
