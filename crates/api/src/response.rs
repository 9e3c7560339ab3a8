//! Shared response envelope types for API handlers.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope for the `/api/v1` routes.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "message": ... }` body used by the integration endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
