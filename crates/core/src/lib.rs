//! Domain primitives for Branch Sentry.
//!
//! This crate has zero internal dependencies so it can be shared by the store,
//! the report dispatcher, the assistant and the HTTP layer alike. Everything
//! here is pure: no I/O, no clocks read implicitly.

pub mod clock;
pub mod dates;
pub mod error;
pub mod field_update;
pub mod issue_status;
pub mod last_worked;
pub mod notify;
pub mod party;
pub mod roles;
pub mod stock;
pub mod template;
pub mod types;
