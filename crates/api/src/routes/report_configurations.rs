//! Route definitions for the `/report-configurations` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::report_configurations as configs;
use crate::state::AppState;

/// Routes mounted at `/report-configurations`.
///
/// ```text
/// GET    /        -> list_report_configurations
/// GET    /{key}   -> get_report_configuration
/// PUT    /{key}   -> upsert_report_configuration
/// DELETE /{key}   -> delete_report_configuration
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(configs::list_report_configurations))
        .route(
            "/{key}",
            get(configs::get_report_configuration)
                .put(configs::upsert_report_configuration)
                .delete(configs::delete_report_configuration),
        )
}
