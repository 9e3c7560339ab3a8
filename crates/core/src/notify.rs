//! Notification payload enums shared by reports and manual sends.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Channel used when neither the team nor the default configuration names one.
pub const DEFAULT_CHANNEL: &str = "telegram";

/// Severity hint understood by the notification service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyType {
    Success,
    #[default]
    Info,
    Warning,
    Error,
}

impl NotifyType {
    pub fn as_str(self) -> &'static str {
        match self {
            NotifyType::Success => "success",
            NotifyType::Info => "info",
            NotifyType::Warning => "warning",
            NotifyType::Error => "error",
        }
    }
}

impl fmt::Display for NotifyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotifyType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(NotifyType::Success),
            "info" => Ok(NotifyType::Info),
            "warning" => Ok(NotifyType::Warning),
            "error" => Ok(NotifyType::Error),
            other => Err(CoreError::Validation(format!(
                "Unknown notify type '{other}'. Expected success, info, warning or error"
            ))),
        }
    }
}

impl TryFrom<String> for NotifyType {
    type Error = CoreError;

    // `Self::Error` would be ambiguous with the `Error` variant.
    fn try_from(value: String) -> Result<Self, CoreError> {
        value.parse()
    }
}

/// Body markup understood by the notification service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageFormat {
    #[default]
    Markdown,
    Html,
    Text,
}
