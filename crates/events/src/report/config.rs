//! Effective report settings for one team.
//!
//! Lookup order per field: the team's own row, then the `default` row, then
//! the built-in fallback (09:00, enabled, telegram, info, not silent).

use sentry_core::notify::{NotifyType, DEFAULT_CHANNEL};
use sentry_db::models::report_configuration::ReportConfiguration;

/// Schedule time used when no configuration row exists at all.
pub const FALLBACK_TIME: &str = "09:00";

/// Settings used to format and send one team's report.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveReportConfig {
    pub time: String,
    pub enabled: bool,
    pub report_title: Option<String>,
    pub report_body: Option<String>,
    pub channel: String,
    pub attach: Option<String>,
    pub notify_type: NotifyType,
    pub silent: bool,
}

impl Default for EffectiveReportConfig {
    fn default() -> Self {
        Self {
            time: FALLBACK_TIME.to_string(),
            enabled: true,
            report_title: None,
            report_body: None,
            channel: DEFAULT_CHANNEL.to_string(),
            attach: None,
            notify_type: NotifyType::default(),
            silent: false,
        }
    }
}

impl EffectiveReportConfig {
    /// Merge a team row over the default row over the fallback.
    ///
    /// Empty strings count as unset at every layer.
    pub fn merge(team: Option<&ReportConfiguration>, default: Option<&ReportConfiguration>) -> Self {
        let fallback = Self::default();

        let base = team.or(default);
        Self {
            time: base.map(|c| c.time.clone()).unwrap_or(fallback.time),
            enabled: base.map(|c| c.enabled).unwrap_or(fallback.enabled),
            report_title: layered(team, default, |c| c.report_title.as_ref()),
            report_body: layered(team, default, |c| c.report_body.as_ref()),
            channel: layered(team, default, |c| c.channel.as_ref()).unwrap_or(fallback.channel),
            attach: layered(team, default, |c| c.attach.as_ref()),
            notify_type: team
                .and_then(|c| c.notify_type)
                .or_else(|| default.and_then(|c| c.notify_type))
                .unwrap_or(fallback.notify_type),
            silent: team
                .and_then(|c| c.silent)
                .or_else(|| default.and_then(|c| c.silent))
                .unwrap_or(fallback.silent),
        }
    }
}

fn layered(
    team: Option<&ReportConfiguration>,
    default: Option<&ReportConfiguration>,
    field: impl Fn(&ReportConfiguration) -> Option<&String>,
) -> Option<String> {
    team.and_then(|c| set(field(c)))
        .or_else(|| default.and_then(|c| set(field(c))))
}

fn set(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}
