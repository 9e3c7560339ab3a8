use axum::routing::post;
use axum::Router;

use crate::handlers::assistant;
use crate::state::AppState;

/// Routes mounted at `/assistant`.
pub fn router() -> Router<AppState> {
    Router::new().route("/chat", post(assistant::chat))
}
