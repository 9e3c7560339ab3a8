//! Handlers for the `/report-configurations` resource.
//!
//! Keys are party labels or `default`, matched case-insensitively.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use sentry_core::party::normalize_report_config_key;
use sentry_db::models::report_configuration::UpsertReportConfiguration;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/report-configurations
pub async fn list_report_configurations(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let configs = state.store.list_report_configurations().await?;
    Ok(Json(DataResponse { data: configs }))
}

/// GET /api/v1/report-configurations/{key}
pub async fn get_report_configuration(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = normalize_report_config_key(&key)?;
    let config = state.store.get_report_configuration(&id).await?;
    Ok(Json(DataResponse { data: config }))
}

/// PUT /api/v1/report-configurations/{key}
pub async fn upsert_report_configuration(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(input): Json<UpsertReportConfiguration>,
) -> AppResult<impl IntoResponse> {
    let id = normalize_report_config_key(&key)?;
    input.validate()?;

    let config = state
        .store
        .upsert_report_configuration(&input.into_configuration(id, Utc::now()))
        .await?;

    tracing::info!(
        config_id = %config.id,
        time = %config.time,
        enabled = config.enabled,
        user_id = auth.user_id,
        "Report configuration saved"
    );

    Ok(Json(DataResponse { data: config }))
}

/// DELETE /api/v1/report-configurations/{key}
pub async fn delete_report_configuration(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<StatusCode> {
    let id = normalize_report_config_key(&key)?;
    state.store.delete_report_configuration(&id).await?;

    tracing::info!(config_id = %id, user_id = auth.user_id, "Report configuration deleted");

    Ok(StatusCode::NO_CONTENT)
}
