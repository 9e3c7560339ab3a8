//! Outbound notification delivery.
//!
//! Everything that sends a message goes through [`NotificationSender`], so the
//! report dispatcher and the manual-send endpoint can run against the HTTP
//! client in production and a [`recording::RecordingSender`] in tests.

use async_trait::async_trait;
use sentry_core::notify::{MessageFormat, NotifyType};
use serde::{Deserialize, Serialize};

pub mod notify_api;
pub mod recording;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for notification delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The notification service returned a non-2xx status code.
    #[error("API request failed with status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Rejected without being sent. Used by test senders.
    #[error("Delivery rejected: {0}")]
    Rejected(String),
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// JSON body accepted by the notification service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub channel: String,
    pub title: String,
    pub body: String,
    pub format: MessageFormat,
    pub notify_type: NotifyType,
    pub silent: bool,
    #[serde(default, skip_serializing_if = "no_attachments")]
    pub attach: Option<Vec<String>>,
}

fn no_attachments(attach: &Option<Vec<String>>) -> bool {
    attach.as_ref().is_none_or(|urls| urls.is_empty())
}

impl NotificationPayload {
    /// Attach a single URL; blank values leave the payload without `attach`.
    pub fn with_attachment(mut self, url: Option<&str>) -> Self {
        self.attach = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(|u| vec![u.to_string()]);
        self
    }
}

// ---------------------------------------------------------------------------
// Sender
// ---------------------------------------------------------------------------

#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Deliver one notification. A single attempt; callers decide what a
    /// failure means.
    async fn send(&self, payload: &NotificationPayload) -> Result<(), DeliveryError>;
}
