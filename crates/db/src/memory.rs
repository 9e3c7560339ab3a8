//! In-process store for tests and local runs without a database.
//!
//! All collections sit behind one `tokio::sync::RwLock`, so every write is a
//! single critical section. That gives the stock adjustment the same
//! all-or-nothing behaviour as the PostgreSQL transaction.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use sentry_core::error::CoreError;
use sentry_core::last_worked::LastWorkedUpdate;
use sentry_core::stock::apply_movement;
use sentry_core::types::{DbId, Timestamp};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::branch::{Branch, CreateBranch, UpdateBranch};
use crate::models::issue::{Issue, IssueChanges, NewIssue};
use crate::models::report_configuration::ReportConfiguration;
use crate::models::spare_part::{
    CreateSparePart, NewSparePartLog, SparePart, SparePartLog, SparePartLogFilter,
    UpdateSparePart,
};
use crate::models::user::{NewUser, User};
use crate::store::{
    BranchStore, IssueStore, ReportConfigStore, SparePartStore, Store, StoreResult, UserStore,
};

#[derive(Default)]
struct Tables {
    next_id: DbId,
    branches: BTreeMap<DbId, Branch>,
    issues: BTreeMap<DbId, Issue>,
    spare_parts: BTreeMap<DbId, SparePart>,
    spare_part_logs: BTreeMap<DbId, SparePartLog>,
    report_configurations: BTreeMap<String, ReportConfiguration>,
    users: BTreeMap<DbId, User>,
}

impl Tables {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn branch_mut(&mut self, id: DbId) -> StoreResult<&mut Branch> {
        self.branches
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Branch", id))
    }

    fn ensure_branch(&self, id: DbId) -> StoreResult<()> {
        if self.branches.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::not_found("Branch", id))
        }
    }

    fn insert_branch(&mut self, input: &CreateBranch, now: Timestamp) -> Branch {
        let branch = Branch {
            id: self.next_id(),
            code: input.code.trim().to_string(),
            name: input.name.trim().to_string(),
            ip_address: input.ip_address.trim().to_string(),
            last_worked: None,
            total_tickets: None,
            created_at: now,
            updated_at: now,
        };
        self.branches.insert(branch.id, branch.clone());
        branch
    }
}

/// [`Store`] implementation holding everything in memory.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the backend were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Core(CoreError::Internal(
                "store unavailable".to_string(),
            )))
        } else {
            Ok(())
        }
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (Timestamp, DbId)) {
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
}

#[async_trait]
impl BranchStore for MemoryStore {
    async fn list_branches(&self) -> StoreResult<Vec<Branch>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut branches: Vec<Branch> = tables.branches.values().cloned().collect();
        branches.sort_by_key(|b| (b.name.to_lowercase(), b.id));
        Ok(branches)
    }

    async fn get_branch(&self, id: DbId) -> StoreResult<Branch> {
        self.check_available()?;
        let tables = self.tables.read().await;
        tables
            .branches
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Branch", id))
    }

    async fn create_branch(&self, input: &CreateBranch) -> StoreResult<Branch> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        Ok(tables.insert_branch(input, Utc::now()))
    }

    async fn import_branches(&self, inputs: &[CreateBranch]) -> StoreResult<Vec<Branch>> {
        self.check_available()?;
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        Ok(inputs
            .iter()
            .map(|input| tables.insert_branch(input, now))
            .collect())
    }

    async fn update_branch(&self, id: DbId, input: &UpdateBranch) -> StoreResult<Branch> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let branch = tables.branch_mut(id)?;
        if let Some(code) = &input.code {
            branch.code = code.trim().to_string();
        }
        if let Some(name) = &input.name {
            branch.name = name.trim().to_string();
        }
        if let Some(ip_address) = &input.ip_address {
            branch.ip_address = ip_address.trim().to_string();
        }
        branch.last_worked = input.last_worked.clone().apply(branch.last_worked);
        branch.updated_at = Utc::now();
        Ok(branch.clone())
    }

    async fn delete_branch(&self, id: DbId) -> StoreResult<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        tables
            .branches
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("Branch", id))?;
        tables.issues.retain(|_, issue| issue.branch_id != id);
        tables.spare_part_logs.retain(|_, log| log.branch_id != id);
        Ok(())
    }

    async fn mark_branches_worked(
        &self,
        updates: &[LastWorkedUpdate],
        at: Timestamp,
    ) -> StoreResult<usize> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let mut touched = 0;
        for update in updates {
            if let Some(branch) = tables.branches.get_mut(&update.branch_id) {
                branch.last_worked = Some(at);
                branch.total_tickets = Some(update.total_tickets);
                branch.updated_at = at;
                touched += 1;
            }
        }
        Ok(touched)
    }
}

#[async_trait]
impl IssueStore for MemoryStore {
    async fn list_issues(&self) -> StoreResult<Vec<Issue>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut issues: Vec<Issue> = tables.issues.values().cloned().collect();
        newest_first(&mut issues, |i| (i.opened_at, i.id));
        Ok(issues)
    }

    async fn list_branch_issues(&self, branch_id: DbId) -> StoreResult<Vec<Issue>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        tables.ensure_branch(branch_id)?;
        let mut issues: Vec<Issue> = tables
            .issues
            .values()
            .filter(|i| i.branch_id == branch_id)
            .cloned()
            .collect();
        newest_first(&mut issues, |i| (i.opened_at, i.id));
        Ok(issues)
    }

    async fn get_issue(&self, id: DbId) -> StoreResult<Issue> {
        self.check_available()?;
        let tables = self.tables.read().await;
        tables
            .issues
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Issue", id))
    }

    async fn create_issue(&self, input: &NewIssue) -> StoreResult<Issue> {
        self.check_available()?;
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        tables.ensure_branch(input.branch_id)?;
        let issue = Issue {
            id: tables.next_id(),
            branch_id: input.branch_id,
            description: input.description.clone(),
            opened_at: input.opened_at,
            responsibility: input.responsibility,
            status: input.status,
            ticket_number: input.ticket_number.clone(),
            ticket_url: input.ticket_url.clone(),
            closing_date: input.closing_date,
            created_at: now,
            updated_at: now,
        };
        tables.issues.insert(issue.id, issue.clone());
        Ok(issue)
    }

    async fn update_issue(&self, id: DbId, changes: IssueChanges) -> StoreResult<Issue> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if let Some(branch_id) = changes.branch_id {
            tables.ensure_branch(branch_id)?;
        }
        let issue = tables
            .issues
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Issue", id))?;
        changes.apply_to(issue, Utc::now());
        Ok(issue.clone())
    }

    async fn delete_issue(&self, id: DbId) -> StoreResult<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        tables
            .issues
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("Issue", id))
    }
}

#[async_trait]
impl SparePartStore for MemoryStore {
    async fn list_spare_parts(&self) -> StoreResult<Vec<SparePart>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut parts: Vec<SparePart> = tables.spare_parts.values().cloned().collect();
        parts.sort_by_key(|p| (p.name.to_lowercase(), p.id));
        Ok(parts)
    }

    async fn get_spare_part(&self, id: DbId) -> StoreResult<SparePart> {
        self.check_available()?;
        let tables = self.tables.read().await;
        tables
            .spare_parts
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("SparePart", id))
    }

    async fn create_spare_part(&self, input: &CreateSparePart) -> StoreResult<SparePart> {
        self.check_available()?;
        if input.quantity < 0 {
            return Err(CoreError::Validation("quantity: must not be negative".into()).into());
        }
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        let part = SparePart {
            id: tables.next_id(),
            name: input.name.clone(),
            part_number: input.part_number.clone(),
            quantity: input.quantity,
            description: input.description.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.spare_parts.insert(part.id, part.clone());
        Ok(part)
    }

    async fn update_spare_part(
        &self,
        id: DbId,
        input: &UpdateSparePart,
    ) -> StoreResult<SparePart> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let part = tables
            .spare_parts
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("SparePart", id))?;
        if let Some(name) = &input.name {
            part.name = name.trim().to_string();
        }
        part.part_number = input.part_number.clone().apply(part.part_number.take());
        if let Some(quantity) = input.quantity {
            part.quantity = quantity;
        }
        part.description = input.description.clone().apply(part.description.take());
        part.updated_at = Utc::now();
        Ok(part.clone())
    }

    async fn delete_spare_part(&self, id: DbId) -> StoreResult<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        tables
            .spare_parts
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("SparePart", id))?;
        tables.spare_part_logs.retain(|_, log| log.spare_part_id != id);
        Ok(())
    }

    async fn list_spare_part_logs(
        &self,
        filter: SparePartLogFilter,
    ) -> StoreResult<Vec<SparePartLog>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut logs: Vec<SparePartLog> = tables
            .spare_part_logs
            .values()
            .filter(|log| filter.matches(log))
            .cloned()
            .collect();
        newest_first(&mut logs, |l| (l.logged_at, l.id));
        Ok(logs)
    }

    async fn record_spare_part_log(
        &self,
        input: &NewSparePartLog,
    ) -> StoreResult<(SparePartLog, SparePart)> {
        self.check_available()?;
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        tables.ensure_branch(input.branch_id)?;
        let (part_name, current) = tables
            .spare_parts
            .get(&input.spare_part_id)
            .map(|p| (p.name.clone(), p.quantity))
            .ok_or_else(|| StoreError::not_found("SparePart", input.spare_part_id))?;

        let next = apply_movement(current, input.log_type, input.quantity)?;

        let log = SparePartLog {
            id: tables.next_id(),
            branch_id: input.branch_id,
            spare_part_id: input.spare_part_id,
            spare_part_name: part_name,
            log_type: input.log_type,
            quantity: input.quantity,
            logged_at: input.logged_at,
            notes: input.notes.clone(),
            created_at: now,
        };
        tables.spare_part_logs.insert(log.id, log.clone());

        let part = tables
            .spare_parts
            .get_mut(&input.spare_part_id)
            .ok_or_else(|| StoreError::not_found("SparePart", input.spare_part_id))?;
        part.quantity = next;
        part.updated_at = now;
        Ok((log, part.clone()))
    }
}

#[async_trait]
impl ReportConfigStore for MemoryStore {
    async fn list_report_configurations(&self) -> StoreResult<Vec<ReportConfiguration>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.report_configurations.values().cloned().collect())
    }

    async fn get_report_configuration(&self, id: &str) -> StoreResult<ReportConfiguration> {
        self.check_available()?;
        let tables = self.tables.read().await;
        tables
            .report_configurations
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("ReportConfiguration", id))
    }

    async fn upsert_report_configuration(
        &self,
        config: &ReportConfiguration,
    ) -> StoreResult<ReportConfiguration> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        tables
            .report_configurations
            .insert(config.id.clone(), config.clone());
        Ok(config.clone())
    }

    async fn delete_report_configuration(&self, id: &str) -> StoreResult<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        tables
            .report_configurations
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("ReportConfiguration", id))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.check_available()?;
        let email = email.trim();
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_user(&self, input: &NewUser) -> StoreResult<User> {
        self.check_available()?;
        let email = input.email.trim();
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email.eq_ignore_ascii_case(email)) {
            return Err(
                CoreError::Conflict(format!("A user with email '{email}' already exists")).into(),
            );
        }
        let user = User {
            id: tables.next_id(),
            email: email.to_string(),
            display_name: input.display_name.clone(),
            password_hash: input.password_hash.clone(),
            role: input.role.clone(),
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.check_available()
    }
}
