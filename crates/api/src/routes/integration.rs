//! Root-level integration endpoints (no auth, no `/api/v1` prefix).

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::integration;
use crate::state::AppState;

/// ```text
/// GET  /api/cron/send-open-issues-report   -> send_open_issues_report
/// POST /api/update-branches                -> update_branches
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/cron/send-open-issues-report",
            get(integration::send_open_issues_report),
        )
        .route("/api/update-branches", post(integration::update_branches))
}
