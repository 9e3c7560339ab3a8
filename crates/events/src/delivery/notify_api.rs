//! HTTP client for the notification service.
//!
//! [`NotifyApiClient`] POSTs a JSON [`NotificationPayload`] with a bearer
//! token. Each call is a single attempt; nothing is retried.

use std::time::Duration;

use async_trait::async_trait;

use super::{DeliveryError, NotificationPayload, NotificationSender};

/// Default endpoint of the notification service.
pub const DEFAULT_NOTIFY_API_URL: &str = "https://notify-woi3.onrender.com/api/notify";

/// HTTP request timeout for a single delivery.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Sends notifications to the external notification service.
pub struct NotifyApiClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl NotifyApiClient {
    /// Create a client for `url`, authenticating with `api_key`.
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl NotificationSender for NotifyApiClient {
    async fn send(&self, payload: &NotificationPayload) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                url = %self.url,
                status = status.as_u16(),
                body = %body,
                "Notification API returned an error"
            );
            return Err(DeliveryError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(channel = %payload.channel, title = %payload.title, "Notification sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_keeps_url() {
        let client = NotifyApiClient::new(DEFAULT_NOTIFY_API_URL, "key").unwrap();
        assert_eq!(client.url(), DEFAULT_NOTIFY_API_URL);
    }

    #[test]
    fn delivery_error_display_request() {
        // Build a reqwest error from an invalid URL.
        let req_err = reqwest::Client::new().get("://bad").build().unwrap_err();
        let err = DeliveryError::Request(req_err);
        assert!(err.to_string().contains("HTTP request failed"));
    }
}
