//! Handlers for the `/branches` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use sentry_core::types::DbId;
use sentry_db::models::branch::{Branch, BranchImportRow, CreateBranch, UpdateBranch};
use sentry_db::models::spare_part::SparePartLogFilter;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;
use crate::handlers::assistant::{assistant_error, require_assistant};
use crate::listing::{branch_listing, parse_sort, BranchSort};
use crate::middleware::auth::AuthUser;
use crate::query::SearchSortParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ImportResult {
    pub imported: Vec<Branch>,
    /// Rows dropped for missing code, name or IP address.
    pub skipped: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnomalySummaryRequest {
    #[serde(default)]
    pub system_performance_metrics: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnomalySummary {
    pub summary: String,
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/branches?search=&sort=
pub async fn list_branches(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SearchSortParams>,
) -> AppResult<impl IntoResponse> {
    let sort: BranchSort = parse_sort(params.sort.as_deref())?;
    let (branches, issues) = tokio::try_join!(state.store.list_branches(), state.store.list_issues())?;

    let items = branch_listing(branches, &issues, params.search.as_deref(), sort);
    Ok(Json(DataResponse { data: items }))
}

/// POST /api/v1/branches
pub async fn create_branch(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateBranch>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let branch = state.store.create_branch(&input).await?;

    tracing::info!(branch_id = branch.id, user_id = auth.user_id, "Branch created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: branch })))
}

/// POST /api/v1/branches/import
///
/// Rows missing any required field are skipped; the rest are inserted in one
/// transaction.
pub async fn import_branches(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(rows): Json<Vec<BranchImportRow>>,
) -> AppResult<impl IntoResponse> {
    let total = rows.len();
    let inputs: Vec<CreateBranch> = rows.into_iter().filter_map(BranchImportRow::into_create).collect();
    let skipped = total - inputs.len();

    let imported = if inputs.is_empty() {
        Vec::new()
    } else {
        state.store.import_branches(&inputs).await?
    };

    tracing::info!(
        imported = imported.len(),
        skipped,
        user_id = auth.user_id,
        "Branches imported"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ImportResult { imported, skipped },
        }),
    ))
}

/// GET /api/v1/branches/{id}
pub async fn get_branch(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let branch = state.store.get_branch(id).await?;
    Ok(Json(DataResponse { data: branch }))
}

/// PUT /api/v1/branches/{id}
pub async fn update_branch(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBranch>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let branch = state.store.update_branch(id, &input).await?;

    tracing::info!(branch_id = id, user_id = auth.user_id, "Branch updated");

    Ok(Json(DataResponse { data: branch }))
}

/// DELETE /api/v1/branches/{id}
///
/// Cascades to the branch's issues and usage logs.
pub async fn delete_branch(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.store.delete_branch(id).await?;

    tracing::info!(branch_id = id, user_id = auth.user_id, "Branch deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Nested listings
// ---------------------------------------------------------------------------

/// GET /api/v1/branches/{id}/issues
pub async fn list_branch_issues(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.store.get_branch(id).await?;
    let issues = state.store.list_branch_issues(id).await?;
    Ok(Json(DataResponse { data: issues }))
}

/// GET /api/v1/branches/{id}/spare-part-logs
pub async fn list_branch_spare_part_logs(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.store.get_branch(id).await?;
    let logs = state
        .store
        .list_spare_part_logs(SparePartLogFilter {
            branch_id: Some(id),
            spare_part_id: None,
        })
        .await?;
    Ok(Json(DataResponse { data: logs }))
}

// ---------------------------------------------------------------------------
// Anomaly summary
// ---------------------------------------------------------------------------

/// POST /api/v1/branches/{id}/anomaly-summary
pub async fn anomaly_summary(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AnomalySummaryRequest>,
) -> AppResult<impl IntoResponse> {
    let assistant = require_assistant(&state)?;
    let (branch, issues) =
        tokio::try_join!(state.store.get_branch(id), state.store.list_branch_issues(id))?;

    let summary = assistant
        .summarize_anomalies(&branch, &issues, input.system_performance_metrics.as_deref())
        .await
        .map_err(assistant_error)?;

    tracing::info!(branch_id = id, user_id = auth.user_id, "Anomaly summary generated");

    Ok(Json(DataResponse {
        data: AnomalySummary { summary },
    }))
}
