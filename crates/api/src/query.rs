//! Query parameter types shared by API handlers.

use serde::Deserialize;

/// `?search=&sort=` for listings that support both.
#[derive(Debug, Default, Deserialize)]
pub struct SearchSortParams {
    pub search: Option<String>,
    pub sort: Option<String>,
}

/// Filters for `GET /dashboard/open-issues`.
#[derive(Debug, Default, Deserialize)]
pub struct OpenIssueDashboardParams {
    pub branch: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<String>,
}

/// `?manual=true` on the cron endpoint. Any other value means scheduled.
#[derive(Debug, Default, Deserialize)]
pub struct CronParams {
    pub manual: Option<String>,
}

impl CronParams {
    pub fn is_manual(&self) -> bool {
        self.manual.as_deref() == Some("true")
    }
}
