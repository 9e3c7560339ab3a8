//! Handlers for the `/dashboard` resource.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::listing::latest_open_issues;
use crate::middleware::auth::AuthUser;
use crate::query::OpenIssueDashboardParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard/open-issues?branch=&description=&assigned_to=
pub async fn open_issues(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<OpenIssueDashboardParams>,
) -> AppResult<impl IntoResponse> {
    let (branches, issues) = tokio::try_join!(state.store.list_branches(), state.store.list_issues())?;
    Ok(Json(DataResponse {
        data: latest_open_issues(branches, &issues, &params),
    }))
}
