//! Handlers for the `/spare-parts` and `/spare-part-logs` resources.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use sentry_core::types::DbId;
use sentry_db::models::spare_part::{
    CreateSparePart, CreateSparePartLog, SparePart, SparePartLog, SparePartLogFilter,
    UpdateSparePart,
};
use serde::Serialize;
use validator::Validate;

use crate::error::AppResult;
use crate::listing::{parse_sort, spare_part_listing, SparePartSort};
use crate::middleware::auth::AuthUser;
use crate::query::SearchSortParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// A recorded movement and the part's stock after it.
#[derive(Debug, Serialize)]
pub struct RecordedLog {
    pub log: SparePartLog,
    pub spare_part: SparePart,
}

// ---------------------------------------------------------------------------
// Spare parts
// ---------------------------------------------------------------------------

/// GET /api/v1/spare-parts?search=&sort=
pub async fn list_spare_parts(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SearchSortParams>,
) -> AppResult<impl IntoResponse> {
    let sort: SparePartSort = parse_sort(params.sort.as_deref())?;
    let parts = state.store.list_spare_parts().await?;
    Ok(Json(DataResponse {
        data: spare_part_listing(parts, params.search.as_deref(), sort),
    }))
}

/// POST /api/v1/spare-parts
pub async fn create_spare_part(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSparePart>,
) -> AppResult<impl IntoResponse> {
    let input = input.normalized();
    input.validate()?;
    let part = state.store.create_spare_part(&input).await?;

    tracing::info!(spare_part_id = part.id, user_id = auth.user_id, "Spare part created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: part })))
}

/// GET /api/v1/spare-parts/{id}
pub async fn get_spare_part(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let part = state.store.get_spare_part(id).await?;
    Ok(Json(DataResponse { data: part }))
}

/// PUT /api/v1/spare-parts/{id}
pub async fn update_spare_part(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSparePart>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let part = state.store.update_spare_part(id, &input).await?;

    tracing::info!(spare_part_id = id, user_id = auth.user_id, "Spare part updated");

    Ok(Json(DataResponse { data: part }))
}

/// DELETE /api/v1/spare-parts/{id}
///
/// Removes the part together with its usage logs.
pub async fn delete_spare_part(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.store.delete_spare_part(id).await?;

    tracing::info!(spare_part_id = id, user_id = auth.user_id, "Spare part deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Usage logs
// ---------------------------------------------------------------------------

/// GET /api/v1/spare-part-logs?branch_id=&spare_part_id=
pub async fn list_spare_part_logs(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<SparePartLogFilter>,
) -> AppResult<impl IntoResponse> {
    let logs = state.store.list_spare_part_logs(filter).await?;
    Ok(Json(DataResponse { data: logs }))
}

/// POST /api/v1/spare-part-logs
///
/// Inserts the log and adjusts stock atomically. Usage beyond the current
/// stock is rejected with 409 and leaves the part untouched.
pub async fn record_spare_part_log(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSparePartLog>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    state.store.get_branch(input.branch_id).await?;

    let (log, spare_part) = state
        .store
        .record_spare_part_log(&input.into_new(Utc::now()))
        .await?;

    tracing::info!(
        log_id = log.id,
        spare_part_id = spare_part.id,
        branch_id = log.branch_id,
        log_type = %log.log_type,
        quantity = log.quantity,
        stock = spare_part.quantity,
        user_id = auth.user_id,
        "Spare part movement recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: RecordedLog { log, spare_part },
        }),
    ))
}
