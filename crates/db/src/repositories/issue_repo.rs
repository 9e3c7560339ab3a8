//! Repository for the `issues` table.

use sentry_core::types::DbId;
use sqlx::PgPool;

use crate::models::issue::{Issue, IssueChanges, NewIssue};

/// Column list for `issues` queries.
const COLUMNS: &str = "id, branch_id, description, opened_at, responsibility, status, \
    ticket_number, ticket_url, closing_date, created_at, updated_at";

/// Provides CRUD operations for issues.
pub struct IssueRepo;

impl IssueRepo {
    /// Insert a fully resolved issue, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewIssue) -> Result<Issue, sqlx::Error> {
        let query = format!(
            "INSERT INTO issues \
                (branch_id, description, opened_at, responsibility, status, \
                 ticket_number, ticket_url, closing_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(input.branch_id)
            .bind(&input.description)
            .bind(input.opened_at)
            .bind(input.responsibility.as_str())
            .bind(input.status.as_str())
            .bind(&input.ticket_number)
            .bind(&input.ticket_url)
            .bind(input.closing_date)
            .fetch_one(pool)
            .await
    }

    /// Find an issue by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Issue>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM issues WHERE id = $1");
        sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all issues, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Issue>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM issues ORDER BY opened_at DESC, id DESC");
        sqlx::query_as::<_, Issue>(&query).fetch_all(pool).await
    }

    /// List the issues of one branch, newest first.
    pub async fn list_for_branch(
        pool: &PgPool,
        branch_id: DbId,
    ) -> Result<Vec<Issue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM issues \
             WHERE branch_id = $1 \
             ORDER BY opened_at DESC, id DESC"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(branch_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a resolved patch.
    ///
    /// The closing date is computed from the status the row holds when the
    /// statement runs: stamped on entering `Resolved`, kept while staying
    /// there, cleared otherwise.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: IssueChanges,
    ) -> Result<Option<Issue>, sqlx::Error> {
        let (ticket_number_changed, ticket_number) = changes.ticket_number.into_bind_pair();
        let (ticket_url_changed, ticket_url) = changes.ticket_url.into_bind_pair();
        let query = format!(
            "UPDATE issues SET \
                branch_id = COALESCE($2, branch_id), \
                description = COALESCE($3, description), \
                opened_at = COALESCE($4, opened_at), \
                responsibility = COALESCE($5, responsibility), \
                status = COALESCE($6, status), \
                ticket_number = CASE WHEN $7 THEN $8 ELSE ticket_number END, \
                ticket_url = CASE WHEN $9 THEN $10 ELSE ticket_url END, \
                closing_date = CASE \
                    WHEN COALESCE($6, status) <> 'Resolved' THEN NULL \
                    WHEN status = 'Resolved' THEN COALESCE(closing_date, $11) \
                    ELSE $11 END, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .bind(changes.branch_id)
            .bind(changes.description)
            .bind(changes.opened_at)
            .bind(changes.responsibility.map(|r| r.as_str()))
            .bind(changes.status.map(|s| s.as_str()))
            .bind(ticket_number_changed)
            .bind(ticket_number)
            .bind(ticket_url_changed)
            .bind(ticket_url)
            .bind(changes.resolved_at)
            .fetch_optional(pool)
            .await
    }

    /// Delete an issue. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM issues WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
