//! Relative date helpers used by the assistant.

use chrono::{SecondsFormat, TimeDelta};

use crate::types::Timestamp;

/// RFC 3339 rendering of the instant `days` days before `now`.
///
/// Negative values move forward in time. Returns `None` when the result is
/// outside the representable date range.
pub fn days_ago_iso(now: Timestamp, days: i64) -> Option<String> {
    let delta = TimeDelta::try_days(days)?;
    now.checked_sub_signed(delta)
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
}
