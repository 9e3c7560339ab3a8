//! Report configuration model and upsert DTO.
//!
//! One row per responsible party, keyed by the party label, plus the
//! reserved `default` row whose values fill in whatever a party leaves unset.

use serde::{Deserialize, Serialize};
use sentry_core::clock::validate_schedule_time;
use sentry_core::notify::NotifyType;
use sentry_core::types::Timestamp;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use validator::{Validate, ValidationError};

use super::blank_or_url;

/// A row from the `report_configurations` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfiguration {
    pub id: String,
    pub time: String,
    pub enabled: bool,
    pub report_title: Option<String>,
    pub report_body: Option<String>,
    pub channel: Option<String>,
    pub attach: Option<String>,
    pub notify_type: Option<NotifyType>,
    pub silent: Option<bool>,
    pub updated_at: Timestamp,
}

impl<'r> FromRow<'r, PgRow> for ReportConfiguration {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let notify_type = row
            .try_get::<Option<String>, _>("notify_type")?
            .map(NotifyType::try_from)
            .transpose()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "notify_type".into(),
                source: Box::new(e),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            time: row.try_get("time")?,
            enabled: row.try_get("enabled")?,
            report_title: row.try_get("report_title")?,
            report_body: row.try_get("report_body")?,
            channel: row.try_get("channel")?,
            attach: row.try_get("attach")?,
            notify_type,
            silent: row.try_get("silent")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// DTO for creating or replacing a report configuration.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertReportConfiguration {
    #[validate(custom(function = "schedule_time"))]
    pub time: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub report_title: Option<String>,
    pub report_body: Option<String>,
    pub channel: Option<String>,
    #[validate(custom(function = "blank_or_url"))]
    pub attach: Option<String>,
    pub notify_type: Option<NotifyType>,
    pub silent: Option<bool>,
}

fn enabled_by_default() -> bool {
    true
}

fn schedule_time(value: &str) -> Result<(), ValidationError> {
    validate_schedule_time(value).map_err(|_| {
        ValidationError::new("time").with_message("must be a 24-hour HH:mm time".into())
    })
}

impl UpsertReportConfiguration {
    /// Build the stored row for `id` at `now`.
    ///
    /// Blank text fields are stored as unset so they fall back to the
    /// default configuration.
    pub fn into_configuration(self, id: String, now: Timestamp) -> ReportConfiguration {
        ReportConfiguration {
            id,
            time: self.time.trim().to_string(),
            enabled: self.enabled,
            report_title: non_empty(self.report_title),
            report_body: non_empty(self.report_body),
            channel: super::non_blank(self.channel),
            attach: super::non_blank(self.attach),
            notify_type: self.notify_type,
            silent: self.silent,
            updated_at: now,
        }
    }
}

/// Templates keep their surrounding whitespace; only all-blank values drop.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn dto(json: &str) -> UpsertReportConfiguration {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn rejects_bad_time() {
        assert!(dto(r#"{"time": "9am"}"#).validate().is_err());
        assert!(dto(r#"{"time": "24:00"}"#).validate().is_err());
        assert!(dto(r#"{"time": "07:30"}"#).validate().is_ok());
    }

    #[test]
    fn rejects_non_url_attachment() {
        assert!(dto(r#"{"time": "07:30", "attach": "logo"}"#).validate().is_err());
        assert!(dto(r#"{"time": "07:30", "attach": ""}"#).validate().is_ok());
    }

    #[test]
    fn blank_fields_become_unset() {
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let cfg = dto(r#"{"time": "07:30", "report_title": "  ", "channel": "", "notify_type": "warning"}"#)
            .into_configuration("Zaoma".into(), now);
        assert!(cfg.enabled);
        assert_eq!(cfg.report_title, None);
        assert_eq!(cfg.channel, None);
        assert_eq!(cfg.notify_type, Some(NotifyType::Warning));
        assert_eq!(cfg.updated_at, now);
    }
}
