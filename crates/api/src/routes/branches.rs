//! Route definitions for the `/branches` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::branches;
use crate::state::AppState;

/// Routes mounted at `/branches`.
///
/// ```text
/// GET    /                      -> list_branches
/// POST   /                      -> create_branch
/// POST   /import                -> import_branches
/// GET    /{id}                  -> get_branch
/// PUT    /{id}                  -> update_branch
/// DELETE /{id}                  -> delete_branch
/// GET    /{id}/issues           -> list_branch_issues
/// GET    /{id}/spare-part-logs  -> list_branch_spare_part_logs
/// POST   /{id}/anomaly-summary  -> anomaly_summary
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(branches::list_branches).post(branches::create_branch))
        .route("/import", post(branches::import_branches))
        .route(
            "/{id}",
            get(branches::get_branch)
                .put(branches::update_branch)
                .delete(branches::delete_branch),
        )
        .route("/{id}/issues", get(branches::list_branch_issues))
        .route(
            "/{id}/spare-part-logs",
            get(branches::list_branch_spare_part_logs),
        )
        .route("/{id}/anomaly-summary", post(branches::anomaly_summary))
}
