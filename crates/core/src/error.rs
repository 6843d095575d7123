/// Generic domain failures shared by every layer.
///
/// Device-specific outcomes live in [`crate::device::DeviceError`]; this enum
/// covers input validation and access decisions made outside the store.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Rejected input: bad device fields, malformed query fragments.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Missing, malformed or expired bearer token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the role does not allow the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),
}
