//! HTTP handlers, one module per resource.

pub mod assistant;
pub mod auth;
pub mod branches;
pub mod dashboard;
pub mod integration;
pub mod issues;
pub mod notifications;
pub mod report_configurations;
pub mod spare_parts;
