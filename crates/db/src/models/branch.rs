//! Branch entity models and DTOs.

use serde::{Deserialize, Serialize};
use sentry_core::field_update::FieldUpdate;
use sentry_core::types::{DbId, Timestamp};
use sqlx::FromRow;
use validator::Validate;

use super::not_blank;

/// A row from the `branches` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Branch {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub ip_address: String,
    pub last_worked: Option<Timestamp>,
    pub total_tickets: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Branch as shown in listings, with the number of its issues that carry a
/// ticket number.
#[derive(Debug, Clone, Serialize)]
pub struct BranchListItem {
    #[serde(flatten)]
    pub branch: Branch,
    pub linked_ticket_count: usize,
}

/// DTO for creating a branch.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBranch {
    #[validate(custom(function = "not_blank"))]
    pub code: String,
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(custom(function = "not_blank"))]
    pub ip_address: String,
}

/// DTO for updating a branch. `last_worked` can be explicitly cleared.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBranch {
    #[validate(custom(function = "not_blank"))]
    pub code: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub name: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub last_worked: FieldUpdate<Timestamp>,
}

/// One row of a bulk branch import.
///
/// Spreadsheet exports use `branchId` / `ipAddress`; both spellings are
/// accepted. Rows missing any of the three fields are skipped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BranchImportRow {
    #[serde(default, alias = "branchId", alias = "branch_id")]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "ipAddress")]
    pub ip_address: Option<String>,
}

impl BranchImportRow {
    /// Convert to a create DTO, or `None` when a required field is blank.
    pub fn into_create(self) -> Option<CreateBranch> {
        let code = super::non_blank(self.code)?;
        let name = super::non_blank(self.name)?;
        let ip_address = super::non_blank(self.ip_address)?;
        Some(CreateBranch {
            code,
            name,
            ip_address,
        })
    }
}
