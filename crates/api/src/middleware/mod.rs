//! Request extractors for authentication.

pub mod auth;
