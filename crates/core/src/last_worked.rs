//! Planning for the bulk "last worked" update.
//!
//! A ticket-system export provides `{name, totalTickets}` rows. Branches whose
//! name matches (trimmed, case-insensitive) and that had at least one ticket
//! are stamped as having worked "now". Rows are accepted leniently: anything
//! without a non-empty string `name` and a numeric `totalTickets` is skipped.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::CoreError;
use crate::types::DbId;

/// Message used when the payload is not a non-empty array.
pub const EMPTY_PAYLOAD_MESSAGE: &str = "No data provided to process, or the JSON is not an array.";

/// One usable row of the ticket export.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketCountRow {
    pub name: String,
    pub total_tickets: f64,
}

/// A branch to stamp, with the reported ticket count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastWorkedUpdate {
    pub branch_id: DbId,
    pub total_tickets: i32,
}

/// Extract usable rows from a raw JSON payload.
///
/// Fails only when the payload is not an array or is empty; malformed rows are
/// dropped.
pub fn parse_ticket_rows(payload: &Value) -> Result<Vec<TicketCountRow>, CoreError> {
    let items = match payload.as_array() {
        Some(items) if !items.is_empty() => items,
        _ => return Err(CoreError::Validation(EMPTY_PAYLOAD_MESSAGE.into())),
    };

    Ok(items
        .iter()
        .filter_map(|item| {
            let name = item.get("name")?.as_str()?.trim();
            let total_tickets = item.get("totalTickets")?.as_f64()?;
            if name.is_empty() {
                return None;
            }
            Some(TicketCountRow {
                name: name.to_string(),
                total_tickets,
            })
        })
        .collect())
}

/// Match rows to branches and keep those with a positive ticket count.
///
/// When two branches share a name the last one wins. Every matching row
/// produces an update, so a name repeated in the payload is counted twice.
pub fn plan_last_worked_updates<'a>(
    rows: &[TicketCountRow],
    branches: impl IntoIterator<Item = (DbId, &'a str)>,
) -> Vec<LastWorkedUpdate> {
    let by_name: HashMap<String, DbId> = branches
        .into_iter()
        .map(|(id, name)| (name.to_lowercase(), id))
        .collect();

    rows.iter()
        .filter(|row| row.total_tickets > 0.0)
        .filter_map(|row| {
            by_name
                .get(&row.name.to_lowercase())
                .map(|&branch_id| LastWorkedUpdate {
                    branch_id,
                    // Float-to-int casts saturate.
                    total_tickets: row.total_tickets as i32,
                })
        })
        .collect()
}
