//! Handlers for the `/notifications` resource.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use sentry_core::notify::{MessageFormat, NotifyType};
use sentry_db::models::{blank_or_url, not_blank};
use sentry_events::NotificationPayload;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// A one-off message for the notification service.
#[derive(Debug, Deserialize, Validate)]
pub struct SendNotificationRequest {
    #[validate(custom(function = "not_blank"))]
    pub channel: String,
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub body: String,
    pub format: MessageFormat,
    #[serde(default)]
    pub notify_type: NotifyType,
    #[serde(default)]
    pub silent: bool,
    #[validate(custom(function = "blank_or_url"))]
    pub attach: Option<String>,
}

impl SendNotificationRequest {
    fn into_payload(self) -> NotificationPayload {
        let attach = self.attach;
        NotificationPayload {
            channel: self.channel.trim().to_string(),
            title: self.title,
            body: self.body,
            format: self.format,
            notify_type: self.notify_type,
            silent: self.silent,
            attach: None,
        }
        .with_attachment(attach.as_deref())
    }
}

/// POST /api/v1/notifications/send
pub async fn send_notification(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SendNotificationRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let payload = input.into_payload();

    state.sender.send(&payload).await.map_err(|e| {
        AppError::InternalError(format!("Notification delivery failed: {e}"))
    })?;

    tracing::info!(
        channel = %payload.channel,
        user_id = auth.user_id,
        "Manual notification sent"
    );

    Ok(Json(DataResponse {
        data: MessageResponse {
            message: "Notification sent".to_string(),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(attach: Option<&str>) -> SendNotificationRequest {
        SendNotificationRequest {
            channel: " ops ".into(),
            title: "Title".into(),
            body: "Body".into(),
            format: MessageFormat::Text,
            notify_type: NotifyType::default(),
            silent: false,
            attach: attach.map(String::from),
        }
    }

    #[test]
    fn blank_attachment_is_dropped() {
        let payload = request(Some("  ")).into_payload();
        assert_eq!(payload.channel, "ops");
        assert!(payload.attach.is_none());
    }

    #[test]
    fn attachment_must_be_a_url() {
        assert!(request(Some("not a url")).validate().is_err());
        assert!(request(Some("https://example.com/a.png")).validate().is_ok());
    }
}
