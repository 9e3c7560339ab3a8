//! Route definitions for the `/issues` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::issues;
use crate::state::AppState;

/// Routes mounted at `/issues`.
///
/// ```text
/// GET    /            -> list_issues
/// POST   /            -> create_issue
/// GET    /{id}        -> get_issue
/// PUT    /{id}        -> update_issue
/// DELETE /{id}        -> delete_issue
/// POST   /{id}/clone  -> clone_issue
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(issues::list_issues).post(issues::create_issue))
        .route(
            "/{id}",
            get(issues::get_issue)
                .put(issues::update_issue)
                .delete(issues::delete_issue),
        )
        .route("/{id}/clone", post(issues::clone_issue))
}
