use sensordash_core::device::DeviceError;
use sensordash_core::geo::WkbError;

/// PostgreSQL SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Errors returned by the repositories.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A domain sentinel (not found, name taken, ...).
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// A stored geometry could not be decoded.
    #[error("Malformed device geometry: {0}")]
    Geometry(#[from] WkbError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// The device sentinel, if this error carries one.
    pub fn as_device(&self) -> Option<DeviceError> {
        match self {
            StoreError::Device(e) => Some(*e),
            _ => None,
        }
    }
}

/// Whether `err` is a unique violation of the named constraint.
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
                && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}
