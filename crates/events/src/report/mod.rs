//! Daily open-issues reports, one per responsible team.

pub mod config;
pub mod dispatcher;
pub mod format;
pub mod scheduler;
