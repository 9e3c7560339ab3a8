//! In-memory sender that records payloads instead of delivering them.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{DeliveryError, NotificationPayload, NotificationSender};

/// Records every payload it is asked to send.
///
/// Payloads whose title contains one of the configured markers are rejected
/// and not recorded, which lets tests simulate a failing delivery for one
/// team.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<NotificationPayload>>,
    reject_markers: Mutex<Vec<String>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject any payload whose title contains `marker`.
    pub fn reject_titles_containing(&self, marker: impl Into<String>) {
        if let Ok(mut markers) = self.reject_markers.lock() {
            markers.push(marker.into());
        }
    }

    /// Payloads delivered so far, in send order.
    pub fn sent(&self) -> Vec<NotificationPayload> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send(&self, payload: &NotificationPayload) -> Result<(), DeliveryError> {
        let rejected = self
            .reject_markers
            .lock()
            .map(|markers| markers.iter().any(|m| payload.title.contains(m.as_str())))
            .unwrap_or(false);
        if rejected {
            return Err(DeliveryError::Rejected(payload.title.clone()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(payload.clone());
        }
        Ok(())
    }
}
