//! Responsible parties: the teams issues are assigned to.
//!
//! The party label doubles as the notification routing key and as the id of
//! that team's report configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Reserved report configuration id holding fallback settings.
pub const DEFAULT_REPORT_CONFIG_ID: &str = "default";

/// A team that can own issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum ResponsibleParty {
    Crdb,
    Zaoma,
    Wavetec,
}

impl ResponsibleParty {
    /// Every known party, in display order.
    pub const ALL: [ResponsibleParty; 3] = [
        ResponsibleParty::Crdb,
        ResponsibleParty::Zaoma,
        ResponsibleParty::Wavetec,
    ];

    /// Canonical label, as stored and as shown in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            ResponsibleParty::Crdb => "CRDB",
            ResponsibleParty::Zaoma => "Zaoma",
            ResponsibleParty::Wavetec => "Wavetec",
        }
    }
}

impl fmt::Display for ResponsibleParty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponsibleParty {
    type Err = CoreError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown responsible party '{wanted}'. Expected one of: CRDB, Zaoma, Wavetec"
                ))
            })
    }
}

impl TryFrom<String> for ResponsibleParty {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResponsibleParty> for &'static str {
    fn from(value: ResponsibleParty) -> Self {
        value.as_str()
    }
}

/// Canonicalize a report configuration key.
///
/// Accepts the reserved default id or any party label (case-insensitive) and
/// returns the stored spelling.
pub fn normalize_report_config_key(key: &str) -> Result<String, CoreError> {
    let key = key.trim();
    if key.eq_ignore_ascii_case(DEFAULT_REPORT_CONFIG_ID) {
        return Ok(DEFAULT_REPORT_CONFIG_ID.to_string());
    }
    key.parse::<ResponsibleParty>()
        .map(|party| party.as_str().to_string())
}
