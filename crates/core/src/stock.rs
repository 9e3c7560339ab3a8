//! Spare-part stock movements.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Direction of a spare-part usage log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum SparePartLogType {
    /// A part was installed at a branch; stock goes down.
    Replaced,
    /// A part came back; stock goes up.
    Returned,
}

impl SparePartLogType {
    pub fn as_str(self) -> &'static str {
        match self {
            SparePartLogType::Replaced => "Replaced",
            SparePartLogType::Returned => "Returned",
        }
    }
}

impl fmt::Display for SparePartLogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SparePartLogType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replaced" => Ok(SparePartLogType::Replaced),
            "returned" => Ok(SparePartLogType::Returned),
            other => Err(CoreError::Validation(format!(
                "Unknown log type '{other}'. Expected Replaced or Returned"
            ))),
        }
    }
}

impl TryFrom<String> for SparePartLogType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SparePartLogType> for &'static str {
    fn from(value: SparePartLogType) -> Self {
        value.as_str()
    }
}

/// Compute the stock level after a movement.
///
/// A `Replaced` movement larger than the current stock is a
/// [`CoreError::Conflict`]; the caller must leave stock untouched.
pub fn apply_movement(
    current: i32,
    log_type: SparePartLogType,
    quantity: i32,
) -> Result<i32, CoreError> {
    if quantity < 1 {
        return Err(CoreError::Validation(format!(
            "quantity must be at least 1, got {quantity}"
        )));
    }

    match log_type {
        SparePartLogType::Replaced => {
            if quantity > current {
                return Err(CoreError::Conflict(format!(
                    "Insufficient stock: requested {quantity}, available {current}"
                )));
            }
            Ok(current - quantity)
        }
        SparePartLogType::Returned => current.checked_add(quantity).ok_or_else(|| {
            CoreError::Validation(format!("quantity {quantity} overflows stock level"))
        }),
    }
}
