//! Unauthenticated endpoints called by external schedulers and ticket-export
//! scripts. Responses are plain `{message}` bodies rather than the `{data}`
//! envelope.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use sentry_core::last_worked::{parse_ticket_rows, EMPTY_PAYLOAD_MESSAGE};
use sentry_db::apply_ticket_counts;
use serde::Serialize;
use serde_json::Value;

use crate::query::CronParams;
use crate::response::MessageResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBranchesResponse {
    pub message: String,
    pub updated_count: usize,
}

fn message(status: StatusCode, message: String) -> Response {
    (status, Json(MessageResponse { message })).into_response()
}

/// Reply to a scheduled call while the in-process scheduler owns that job.
pub const SCHEDULER_OWNS_RUN_MESSAGE: &str =
    "Scheduled reports are sent by the built-in scheduler. Nothing sent.";

/// GET /api/cron/send-open-issues-report?manual=true
///
/// Without `manual=true` only parties whose configured time matches the
/// current minute are reported. That scheduled mode is a no-op while the
/// in-process scheduler is running, so an external cron left in place does
/// not send every report twice.
pub async fn send_open_issues_report(
    State(state): State<AppState>,
    Query(params): Query<CronParams>,
) -> Response {
    if !params.is_manual() && state.config.scheduler_enabled {
        tracing::debug!("Scheduled report call ignored; built-in scheduler is enabled");
        return message(StatusCode::OK, SCHEDULER_OWNS_RUN_MESSAGE.to_string());
    }

    let now = Utc::now();
    let result = if params.is_manual() {
        state.dispatcher.run_manual(now).await
    } else {
        state.dispatcher.run_scheduled(now).await
    };

    match result {
        Ok(outcome) => {
            tracing::info!(manual = params.is_manual(), sent = outcome.sent(), "Report run finished");
            message(StatusCode::OK, outcome.message())
        }
        Err(e) => {
            tracing::error!(error = %e, manual = params.is_manual(), "Report run failed");
            message(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to process report: {e}"),
            )
        }
    }
}

/// POST /api/update-branches
///
/// Body: a JSON array of `{name, totalTickets}` rows from the ticket export.
/// Branches matched by name with a positive ticket count are stamped as
/// worked now.
pub async fn update_branches(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected ticket export with invalid JSON");
            return message(
                StatusCode::BAD_REQUEST,
                "Error: Invalid JSON in request body.".to_string(),
            );
        }
    };

    let rows = match parse_ticket_rows(&payload) {
        Ok(rows) => rows,
        Err(_) => {
            return message(
                StatusCode::BAD_REQUEST,
                format!("Error: {EMPTY_PAYLOAD_MESSAGE}"),
            );
        }
    };

    match apply_ticket_counts(&*state.store, &rows, Utc::now()).await {
        Ok(updated_count) => (
            StatusCode::OK,
            Json(UpdateBranchesResponse {
                message: format!(
                    "Successfully processed the request. Updated the 'lastWorked' status for {updated_count} branches."
                ),
                updated_count,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Ticket export processing failed");
            message(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to process request: {e}"),
            )
        }
    }
}
