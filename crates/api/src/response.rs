//! Shared response envelope types for API handlers.
//!
//! Reads use a `{ "data": ... }` envelope; mutations that return no entity
//! answer with `{ "message": ... }`.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "message": "..." }` body for successful mutations.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
