//! Report time zone and date rendering.
//!
//! Report configurations store a wall-clock `HH:mm` time. The scheduler
//! compares it against "now" rendered in a single configured IANA time zone,
//! and report dates are rendered in that same zone.

use chrono::{DateTime, NaiveTime};
use chrono_tz::Tz;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Time zone used when none is configured (EAT, UTC+3, no DST).
pub const DEFAULT_REPORT_TIMEZONE: &str = "Africa/Nairobi";

/// Format of scheduled report times.
const SCHEDULE_TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportClock {
    tz: Tz,
}

impl ReportClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Build a clock from an IANA zone name such as `"Africa/Nairobi"` or `"UTC"`.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        let tz: Tz = name
            .trim()
            .parse()
            .map_err(|_| CoreError::Validation(format!("Unknown time zone '{name}'")))?;
        Ok(Self { tz })
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn local(&self, at: Timestamp) -> DateTime<Tz> {
        at.with_timezone(&self.tz)
    }

    /// `HH:mm` wall-clock time in the report zone, compared against
    /// configuration times.
    pub fn schedule_time(&self, at: Timestamp) -> String {
        self.local(at).format(SCHEDULE_TIME_FORMAT).to_string()
    }

    /// Long report date, e.g. `05 Mar 2026`.
    pub fn report_date(&self, at: Timestamp) -> String {
        self.local(at).format("%d %b %Y").to_string()
    }

    /// Short date used for issue opening dates, e.g. `05 Mar`.
    pub fn short_date(&self, at: Timestamp) -> String {
        self.local(at).format("%d %b").to_string()
    }
}

impl Default for ReportClock {
    fn default() -> Self {
        Self {
            tz: chrono_tz::Africa::Nairobi,
        }
    }
}

/// Validate a configuration time string: two-digit 24h `HH:mm`.
pub fn validate_schedule_time(value: &str) -> Result<(), CoreError> {
    let well_formed = value.len() == 5
        && value.as_bytes()[2] == b':'
        && NaiveTime::parse_from_str(value, SCHEDULE_TIME_FORMAT).is_ok();
    if !well_formed {
        return Err(CoreError::Validation(format!(
            "time must be in HH:mm 24-hour format, got '{value}'"
        )));
    }
    Ok(())
}
