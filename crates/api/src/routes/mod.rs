pub mod assistant;
pub mod auth;
pub mod branches;
pub mod dashboard;
pub mod health;
pub mod integration;
pub mod issues;
pub mod notifications;
pub mod report_configurations;
pub mod spare_parts;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                               login (public)
/// /auth/me                                  current user
///
/// /branches                                 list, create
/// /branches/import                          bulk import (POST)
/// /branches/{id}                            get, update, delete
/// /branches/{id}/issues                     issues of a branch
/// /branches/{id}/spare-part-logs            usage logs of a branch
/// /branches/{id}/anomaly-summary            AI anomaly summary (POST)
///
/// /issues                                   list, create
/// /issues/{id}                              get, update, delete
/// /issues/{id}/clone                        clone (POST)
///
/// /spare-parts                              list, create
/// /spare-parts/{id}                         get, update, delete
/// /spare-part-logs                          list, record
///
/// /report-configurations                    list
/// /report-configurations/{key}              get, upsert, delete
///
/// /notifications/send                       manual notification (POST)
/// /dashboard/open-issues                    latest open issue per branch
/// /assistant/chat                           assistant chat (POST)
/// ```
///
/// All routes except `/auth/login` require a Bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/branches", branches::router())
        .nest("/issues", issues::router())
        .nest("/spare-parts", spare_parts::router())
        .nest("/spare-part-logs", spare_parts::logs_router())
        .nest("/report-configurations", report_configurations::router())
        .nest("/notifications", notifications::router())
        .nest("/dashboard", dashboard::router())
        .nest("/assistant", assistant::router())
}
