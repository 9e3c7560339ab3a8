//! Handlers for the `/issues` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use sentry_core::types::DbId;
use sentry_db::models::issue::{CreateIssue, IssueFilter, UpdateIssue};
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/issues?status=&responsibility=&branch_id=
pub async fn list_issues(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<IssueFilter>,
) -> AppResult<impl IntoResponse> {
    let mut issues = state.store.list_issues().await?;
    issues.retain(|issue| filter.matches(issue));
    Ok(Json(DataResponse { data: issues }))
}

/// POST /api/v1/issues
pub async fn create_issue(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateIssue>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    // Surfaces a 404 instead of a foreign key violation.
    state.store.get_branch(input.branch_id).await?;

    let issue = state.store.create_issue(&input.into_new(Utc::now())).await?;

    tracing::info!(
        issue_id = issue.id,
        branch_id = issue.branch_id,
        user_id = auth.user_id,
        "Issue created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: issue })))
}

/// GET /api/v1/issues/{id}
pub async fn get_issue(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let issue = state.store.get_issue(id).await?;
    Ok(Json(DataResponse { data: issue }))
}

/// PUT /api/v1/issues/{id}
///
/// The closing date follows the status transition: set on entering
/// `Resolved`, cleared on leaving it. The store decides it against the
/// row's current status.
pub async fn update_issue(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateIssue>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    if let Some(branch_id) = input.branch_id {
        state.store.get_branch(branch_id).await?;
    }

    let changes = input.into_changes(Utc::now());
    let issue = state.store.update_issue(id, changes).await?;

    tracing::info!(
        issue_id = id,
        status = %issue.status,
        user_id = auth.user_id,
        "Issue updated"
    );

    Ok(Json(DataResponse { data: issue }))
}

/// DELETE /api/v1/issues/{id}
pub async fn delete_issue(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.store.delete_issue(id).await?;

    tracing::info!(issue_id = id, user_id = auth.user_id, "Issue deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/issues/{id}/clone
///
/// Reopens a copy of the issue with a prefixed description.
pub async fn clone_issue(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let source = state.store.get_issue(id).await?;
    let issue = state.store.create_issue(&source.clone_at(Utc::now())).await?;

    tracing::info!(
        source_id = id,
        issue_id = issue.id,
        user_id = auth.user_id,
        "Issue cloned"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: issue })))
}
