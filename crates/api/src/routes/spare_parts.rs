//! Route definitions for spare parts and their usage logs.

use axum::routing::get;
use axum::Router;

use crate::handlers::spare_parts;
use crate::state::AppState;

/// Routes mounted at `/spare-parts`.
///
/// ```text
/// GET    /      -> list_spare_parts
/// POST   /      -> create_spare_part
/// GET    /{id}  -> get_spare_part
/// PUT    /{id}  -> update_spare_part
/// DELETE /{id}  -> delete_spare_part
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(spare_parts::list_spare_parts).post(spare_parts::create_spare_part),
        )
        .route(
            "/{id}",
            get(spare_parts::get_spare_part)
                .put(spare_parts::update_spare_part)
                .delete(spare_parts::delete_spare_part),
        )
}

/// Routes mounted at `/spare-part-logs`.
pub fn logs_router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(spare_parts::list_spare_part_logs).post(spare_parts::record_spare_part_log),
    )
}
