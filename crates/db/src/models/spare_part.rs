//! Spare part and usage log models and DTOs.

use serde::{Deserialize, Serialize};
use sentry_core::field_update::FieldUpdate;
use sentry_core::stock::SparePartLogType;
use sentry_core::types::{DbId, Timestamp};
use sqlx::FromRow;
use validator::Validate;

use super::not_blank;

/// A row from the `spare_parts` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct SparePart {
    pub id: DbId,
    pub name: String,
    pub part_number: Option<String>,
    pub quantity: i32,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a spare part.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSparePart {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    pub part_number: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub quantity: i32,
    pub description: Option<String>,
}

impl CreateSparePart {
    /// Trim text fields and drop blank optionals.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            part_number: super::non_blank(self.part_number),
            quantity: self.quantity,
            description: super::non_blank(self.description),
        }
    }
}

/// DTO for updating a spare part.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSparePart {
    #[validate(custom(function = "not_blank"))]
    pub name: Option<String>,
    #[serde(default)]
    pub part_number: FieldUpdate<String>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub quantity: Option<i32>,
    #[serde(default)]
    pub description: FieldUpdate<String>,
}

/// A row from the `spare_part_logs` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct SparePartLog {
    pub id: DbId,
    pub branch_id: DbId,
    pub spare_part_id: DbId,
    pub spare_part_name: String,
    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub log_type: SparePartLogType,
    pub quantity: i32,
    pub logged_at: Timestamp,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for recording a spare part movement at a branch.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSparePartLog {
    pub branch_id: DbId,
    pub spare_part_id: DbId,
    #[serde(rename = "type")]
    pub log_type: SparePartLogType,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub quantity: i32,
    pub logged_at: Option<Timestamp>,
    pub notes: Option<String>,
}

impl CreateSparePartLog {
    pub fn into_new(self, now: Timestamp) -> NewSparePartLog {
        NewSparePartLog {
            branch_id: self.branch_id,
            spare_part_id: self.spare_part_id,
            log_type: self.log_type,
            quantity: self.quantity,
            logged_at: self.logged_at.unwrap_or(now),
            notes: super::non_blank(self.notes),
        }
    }
}

/// Resolved insert for `spare_part_logs`. The part name is copied from the
/// part row inside the stock transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSparePartLog {
    pub branch_id: DbId,
    pub spare_part_id: DbId,
    pub log_type: SparePartLogType,
    pub quantity: i32,
    pub logged_at: Timestamp,
    pub notes: Option<String>,
}

/// Query filters for listing usage logs.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SparePartLogFilter {
    pub branch_id: Option<DbId>,
    pub spare_part_id: Option<DbId>,
}

impl SparePartLogFilter {
    pub fn matches(&self, log: &SparePartLog) -> bool {
        self.branch_id.is_none_or(|b| b == log.branch_id)
            && self.spare_part_id.is_none_or(|p| p == log.spare_part_id)
    }
}
