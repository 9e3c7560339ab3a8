//! Repository for the `report_configurations` table.

use sqlx::PgPool;

use crate::models::report_configuration::ReportConfiguration;

/// Column list for `report_configurations` queries.
const COLUMNS: &str = "id, time, enabled, report_title, report_body, channel, attach, \
    notify_type, silent, updated_at";

/// Provides keyed access to report configurations.
pub struct ReportConfigurationRepo;

impl ReportConfigurationRepo {
    /// List every configuration, the default row included.
    pub async fn list(pool: &PgPool) -> Result<Vec<ReportConfiguration>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM report_configurations ORDER BY id");
        sqlx::query_as::<_, ReportConfiguration>(&query)
            .fetch_all(pool)
            .await
    }

    /// Find a configuration by key.
    pub async fn find(pool: &PgPool, id: &str) -> Result<Option<ReportConfiguration>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM report_configurations WHERE id = $1");
        sqlx::query_as::<_, ReportConfiguration>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or replace a configuration.
    ///
    /// Uses `INSERT ... ON CONFLICT (id) DO UPDATE` to upsert in a single
    /// round-trip.
    pub async fn upsert(
        pool: &PgPool,
        config: &ReportConfiguration,
    ) -> Result<ReportConfiguration, sqlx::Error> {
        let query = format!(
            "INSERT INTO report_configurations \
                (id, time, enabled, report_title, report_body, channel, attach, notify_type, silent) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (id) DO UPDATE SET \
                time = EXCLUDED.time, \
                enabled = EXCLUDED.enabled, \
                report_title = EXCLUDED.report_title, \
                report_body = EXCLUDED.report_body, \
                channel = EXCLUDED.channel, \
                attach = EXCLUDED.attach, \
                notify_type = EXCLUDED.notify_type, \
                silent = EXCLUDED.silent, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReportConfiguration>(&query)
            .bind(&config.id)
            .bind(&config.time)
            .bind(config.enabled)
            .bind(&config.report_title)
            .bind(&config.report_body)
            .bind(&config.channel)
            .bind(&config.attach)
            .bind(config.notify_type.map(|t| t.as_str()))
            .bind(config.silent)
            .fetch_one(pool)
            .await
    }

    /// Delete a configuration. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM report_configurations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
