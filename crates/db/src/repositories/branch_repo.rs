//! Repository for the `branches` table.

use sentry_core::last_worked::LastWorkedUpdate;
use sentry_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::branch::{Branch, CreateBranch, UpdateBranch};

/// Column list for `branches` queries.
const COLUMNS: &str =
    "id, code, name, ip_address, last_worked, total_tickets, created_at, updated_at";

/// Provides CRUD operations for branches.
pub struct BranchRepo;

impl BranchRepo {
    /// Insert a new branch, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateBranch) -> Result<Branch, sqlx::Error> {
        let query = format!(
            "INSERT INTO branches (code, name, ip_address) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Branch>(&query)
            .bind(input.code.trim())
            .bind(input.name.trim())
            .bind(input.ip_address.trim())
            .fetch_one(pool)
            .await
    }

    /// Insert many branches in one transaction.
    pub async fn create_many(
        pool: &PgPool,
        inputs: &[CreateBranch],
    ) -> Result<Vec<Branch>, sqlx::Error> {
        let query = format!(
            "INSERT INTO branches (code, name, ip_address) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        let mut tx = pool.begin().await?;
        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            let branch = sqlx::query_as::<_, Branch>(&query)
                .bind(input.code.trim())
                .bind(input.name.trim())
                .bind(input.ip_address.trim())
                .fetch_one(&mut *tx)
                .await?;
            created.push(branch);
        }
        tx.commit().await?;
        Ok(created)
    }

    /// Find a branch by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Branch>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM branches WHERE id = $1");
        sqlx::query_as::<_, Branch>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all branches ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Branch>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM branches ORDER BY LOWER(name), id");
        sqlx::query_as::<_, Branch>(&query).fetch_all(pool).await
    }

    /// Update a branch. Only fields that are set in `input` are changed.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBranch,
    ) -> Result<Option<Branch>, sqlx::Error> {
        let (last_worked_changed, last_worked) = input.last_worked.clone().into_bind_pair();
        let query = format!(
            "UPDATE branches SET \
                code = COALESCE($2, code), \
                name = COALESCE($3, name), \
                ip_address = COALESCE($4, ip_address), \
                last_worked = CASE WHEN $5 THEN $6 ELSE last_worked END, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Branch>(&query)
            .bind(id)
            .bind(input.code.as_deref().map(str::trim))
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.ip_address.as_deref().map(str::trim))
            .bind(last_worked_changed)
            .bind(last_worked)
            .fetch_optional(pool)
            .await
    }

    /// Stamp one branch as worked at `at` with the reported ticket count.
    ///
    /// Returns `true` if the row existed.
    pub async fn mark_worked(
        pool: &PgPool,
        update: LastWorkedUpdate,
        at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE branches SET last_worked = $2, total_tickets = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(update.branch_id)
        .bind(at)
        .bind(update.total_tickets)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a branch. Issues and usage logs go with it via `ON DELETE CASCADE`.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM branches WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
