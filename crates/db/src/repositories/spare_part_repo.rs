//! Repository for the `spare_parts` and `spare_part_logs` tables.

use sentry_core::stock::apply_movement;
use sentry_core::types::DbId;
use sqlx::PgPool;

use crate::error::StoreError;
use crate::models::spare_part::{
    CreateSparePart, NewSparePartLog, SparePart, SparePartLog, SparePartLogFilter,
    UpdateSparePart,
};

/// Column list for `spare_parts` queries.
const PART_COLUMNS: &str = "id, name, part_number, quantity, description, created_at, updated_at";

/// Column list for `spare_part_logs` queries.
const LOG_COLUMNS: &str = "id, branch_id, spare_part_id, spare_part_name, log_type, quantity, \
    logged_at, notes, created_at";

/// Provides CRUD for spare parts and the stock-adjusting log insert.
pub struct SparePartRepo;

impl SparePartRepo {
    // -----------------------------------------------------------------------
    // Parts
    // -----------------------------------------------------------------------

    /// Insert a new spare part, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSparePart) -> Result<SparePart, sqlx::Error> {
        let query = format!(
            "INSERT INTO spare_parts (name, part_number, quantity, description) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {PART_COLUMNS}"
        );
        sqlx::query_as::<_, SparePart>(&query)
            .bind(&input.name)
            .bind(&input.part_number)
            .bind(input.quantity)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find a spare part by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SparePart>, sqlx::Error> {
        let query = format!("SELECT {PART_COLUMNS} FROM spare_parts WHERE id = $1");
        sqlx::query_as::<_, SparePart>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all spare parts ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<SparePart>, sqlx::Error> {
        let query = format!("SELECT {PART_COLUMNS} FROM spare_parts ORDER BY LOWER(name), id");
        sqlx::query_as::<_, SparePart>(&query).fetch_all(pool).await
    }

    /// Update a spare part. Only fields that are set in `input` are changed.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSparePart,
    ) -> Result<Option<SparePart>, sqlx::Error> {
        let (part_number_changed, part_number) = input.part_number.clone().into_bind_pair();
        let (description_changed, description) = input.description.clone().into_bind_pair();
        let query = format!(
            "UPDATE spare_parts SET \
                name = COALESCE($2, name), \
                part_number = CASE WHEN $3 THEN $4 ELSE part_number END, \
                quantity = COALESCE($5, quantity), \
                description = CASE WHEN $6 THEN $7 ELSE description END, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PART_COLUMNS}"
        );
        sqlx::query_as::<_, SparePart>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(part_number_changed)
            .bind(part_number)
            .bind(input.quantity)
            .bind(description_changed)
            .bind(description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a spare part and its logs. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM spare_parts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Usage logs
    // -----------------------------------------------------------------------

    /// List usage logs matching the filter, newest first.
    pub async fn list_logs(
        pool: &PgPool,
        filter: SparePartLogFilter,
    ) -> Result<Vec<SparePartLog>, sqlx::Error> {
        let query = format!(
            "SELECT {LOG_COLUMNS} FROM spare_part_logs \
             WHERE ($1::BIGINT IS NULL OR branch_id = $1) \
               AND ($2::BIGINT IS NULL OR spare_part_id = $2) \
             ORDER BY logged_at DESC, id DESC"
        );
        sqlx::query_as::<_, SparePartLog>(&query)
            .bind(filter.branch_id)
            .bind(filter.spare_part_id)
            .fetch_all(pool)
            .await
    }

    /// Record a usage log and adjust the part's stock atomically.
    ///
    /// The part row is locked with `FOR UPDATE` for the duration of the
    /// transaction. An over-draw fails with a conflict and leaves stock as it
    /// was.
    pub async fn record_log(
        pool: &PgPool,
        input: &NewSparePartLog,
    ) -> Result<(SparePartLog, SparePart), StoreError> {
        let mut tx = pool.begin().await?;

        let locked: Option<(String, i32)> =
            sqlx::query_as("SELECT name, quantity FROM spare_parts WHERE id = $1 FOR UPDATE")
                .bind(input.spare_part_id)
                .fetch_optional(&mut *tx)
                .await?;
        let (part_name, current) =
            locked.ok_or_else(|| StoreError::not_found("SparePart", input.spare_part_id))?;

        let branch_exists: Option<(DbId,)> = sqlx::query_as("SELECT id FROM branches WHERE id = $1")
            .bind(input.branch_id)
            .fetch_optional(&mut *tx)
            .await?;
        if branch_exists.is_none() {
            return Err(StoreError::not_found("Branch", input.branch_id));
        }

        let next = apply_movement(current, input.log_type, input.quantity)?;

        let update = format!(
            "UPDATE spare_parts SET quantity = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PART_COLUMNS}"
        );
        let part = sqlx::query_as::<_, SparePart>(&update)
            .bind(input.spare_part_id)
            .bind(next)
            .fetch_one(&mut *tx)
            .await?;

        let insert = format!(
            "INSERT INTO spare_part_logs \
                (branch_id, spare_part_id, spare_part_name, log_type, quantity, logged_at, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {LOG_COLUMNS}"
        );
        let log = sqlx::query_as::<_, SparePartLog>(&insert)
            .bind(input.branch_id)
            .bind(input.spare_part_id)
            .bind(&part_name)
            .bind(input.log_type.as_str())
            .bind(input.quantity)
            .bind(input.logged_at)
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(
            spare_part_id = part.id,
            log_type = log.log_type.as_str(),
            quantity = part.quantity,
            "Spare part stock adjusted",
        );
        Ok((log, part))
    }
}
