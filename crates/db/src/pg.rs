//! PostgreSQL store backed by the `*Repo` query structs.

use async_trait::async_trait;
use futures::future::try_join_all;
use sentry_core::last_worked::LastWorkedUpdate;
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
use crate::repositories::{BranchRepo, IssueRepo, ReportConfigurationRepo, SparePartRepo, UserRepo};
use crate::store::{
    BranchStore, IssueStore, ReportConfigStore, SparePartStore, Store, StoreResult, UserStore,
};
use crate::DbPool;

/// [`Store`] implementation over a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn ensure_branch(&self, id: DbId) -> StoreResult<()> {
        BranchRepo::find_by_id(&self.pool, id)
            .await?
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("Branch", id))
    }
}

#[async_trait]
impl BranchStore for PgStore {
    async fn list_branches(&self) -> StoreResult<Vec<Branch>> {
        Ok(BranchRepo::list(&self.pool).await?)
    }

    async fn get_branch(&self, id: DbId) -> StoreResult<Branch> {
        BranchRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| StoreError::not_found("Branch", id))
    }

    async fn create_branch(&self, input: &CreateBranch) -> StoreResult<Branch> {
        Ok(BranchRepo::create(&self.pool, input).await?)
    }

    async fn import_branches(&self, inputs: &[CreateBranch]) -> StoreResult<Vec<Branch>> {
        Ok(BranchRepo::create_many(&self.pool, inputs).await?)
    }

    async fn update_branch(&self, id: DbId, input: &UpdateBranch) -> StoreResult<Branch> {
        BranchRepo::update(&self.pool, id, input)
            .await?
            .ok_or_else(|| StoreError::not_found("Branch", id))
    }

    async fn delete_branch(&self, id: DbId) -> StoreResult<()> {
        if BranchRepo::delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(StoreError::not_found("Branch", id))
        }
    }

    async fn mark_branches_worked(
        &self,
        updates: &[LastWorkedUpdate],
        at: Timestamp,
    ) -> StoreResult<usize> {
        let applied = try_join_all(
            updates
                .iter()
                .map(|update| BranchRepo::mark_worked(&self.pool, *update, at)),
        )
        .await?;
        Ok(applied.into_iter().filter(|touched| *touched).count())
    }
}

#[async_trait]
impl IssueStore for PgStore {
    async fn list_issues(&self) -> StoreResult<Vec<Issue>> {
        Ok(IssueRepo::list(&self.pool).await?)
    }

    async fn list_branch_issues(&self, branch_id: DbId) -> StoreResult<Vec<Issue>> {
        self.ensure_branch(branch_id).await?;
        Ok(IssueRepo::list_for_branch(&self.pool, branch_id).await?)
    }

    async fn get_issue(&self, id: DbId) -> StoreResult<Issue> {
        IssueRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| StoreError::not_found("Issue", id))
    }

    async fn create_issue(&self, input: &NewIssue) -> StoreResult<Issue> {
        self.ensure_branch(input.branch_id).await?;
        Ok(IssueRepo::create(&self.pool, input).await?)
    }

    async fn update_issue(&self, id: DbId, changes: IssueChanges) -> StoreResult<Issue> {
        if let Some(branch_id) = changes.branch_id {
            self.ensure_branch(branch_id).await?;
        }
        IssueRepo::update(&self.pool, id, changes)
            .await?
            .ok_or_else(|| StoreError::not_found("Issue", id))
    }

    async fn delete_issue(&self, id: DbId) -> StoreResult<()> {
        if IssueRepo::delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(StoreError::not_found("Issue", id))
        }
    }
}

#[async_trait]
impl SparePartStore for PgStore {
    async fn list_spare_parts(&self) -> StoreResult<Vec<SparePart>> {
        Ok(SparePartRepo::list(&self.pool).await?)
    }

    async fn get_spare_part(&self, id: DbId) -> StoreResult<SparePart> {
        SparePartRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| StoreError::not_found("SparePart", id))
    }

    async fn create_spare_part(&self, input: &CreateSparePart) -> StoreResult<SparePart> {
        Ok(SparePartRepo::create(&self.pool, input).await?)
    }

    async fn update_spare_part(
        &self,
        id: DbId,
        input: &UpdateSparePart,
    ) -> StoreResult<SparePart> {
        SparePartRepo::update(&self.pool, id, input)
            .await?
            .ok_or_else(|| StoreError::not_found("SparePart", id))
    }

    async fn delete_spare_part(&self, id: DbId) -> StoreResult<()> {
        if SparePartRepo::delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(StoreError::not_found("SparePart", id))
        }
    }

    async fn list_spare_part_logs(
        &self,
        filter: SparePartLogFilter,
    ) -> StoreResult<Vec<SparePartLog>> {
        Ok(SparePartRepo::list_logs(&self.pool, filter).await?)
    }

    async fn record_spare_part_log(
        &self,
        input: &NewSparePartLog,
    ) -> StoreResult<(SparePartLog, SparePart)> {
        SparePartRepo::record_log(&self.pool, input).await
    }
}

#[async_trait]
impl ReportConfigStore for PgStore {
    async fn list_report_configurations(&self) -> StoreResult<Vec<ReportConfiguration>> {
        Ok(ReportConfigurationRepo::list(&self.pool).await?)
    }

    async fn get_report_configuration(&self, id: &str) -> StoreResult<ReportConfiguration> {
        ReportConfigurationRepo::find(&self.pool, id)
            .await?
            .ok_or_else(|| StoreError::not_found("ReportConfiguration", id))
    }

    async fn upsert_report_configuration(
        &self,
        config: &ReportConfiguration,
    ) -> StoreResult<ReportConfiguration> {
        Ok(ReportConfigurationRepo::upsert(&self.pool, config).await?)
    }

    async fn delete_report_configuration(&self, id: &str) -> StoreResult<()> {
        if ReportConfigurationRepo::delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(StoreError::not_found("ReportConfiguration", id))
        }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_email(&self.pool, email).await?)
    }

    async fn create_user(&self, input: &NewUser) -> StoreResult<User> {
        Ok(UserRepo::create(&self.pool, input).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
