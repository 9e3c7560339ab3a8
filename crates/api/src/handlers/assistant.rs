//! Handlers for the `/assistant` resource.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use sentry_assistant::{Assistant, AssistantError};
use sentry_db::models::not_blank;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(custom(function = "not_blank"))]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

/// The configured assistant, or 503 when no model key was provided.
pub(crate) fn require_assistant(state: &AppState) -> AppResult<Arc<Assistant>> {
    state
        .assistant
        .clone()
        .ok_or_else(|| AppError::Unavailable("The assistant is not configured".into()))
}

pub(crate) fn assistant_error(err: AssistantError) -> AppError {
    match err {
        AssistantError::Store(store) => AppError::Store(store),
        other => AppError::InternalError(format!("Assistant failure: {other}")),
    }
}

/// POST /api/v1/assistant/chat
pub async fn chat(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ChatRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let assistant = require_assistant(&state)?;

    let reply = assistant
        .chat(input.message.trim(), Utc::now())
        .await
        .map_err(assistant_error)?;

    tracing::debug!(user_id = auth.user_id, reply_len = reply.len(), "Assistant replied");

    Ok(Json(DataResponse {
        data: ChatReply { reply },
    }))
}
