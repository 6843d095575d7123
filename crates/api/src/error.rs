use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sensordash_core::device::DeviceError;
use sensordash_core::error::CoreError;
use sensordash_db::StoreError;
use serde_json::json;

use crate::metrics::MetricsError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`DeviceError`] for domain errors and adds
/// HTTP-specific variants. Implements [`IntoResponse`] to produce consistent
/// JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A generic domain-level error from `sensordash_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A device sentinel (not found, name taken, ...).
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The metrics backend is unavailable or failed.
    #[error(transparent)]
    Metrics(#[from] MetricsError),

    /// A path, query or body that could not be extracted.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Device(e) => AppError::Device(e),
            StoreError::Database(e) => AppError::Database(e),
            StoreError::Geometry(e) => AppError::InternalError(e.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            },

            // --- Device sentinels ---
            AppError::Device(err) => {
                let (status, code) = match err {
                    DeviceError::NotFound | DeviceError::ThresholdNotFound => {
                        (StatusCode::NOT_FOUND, "NOT_FOUND")
                    }
                    DeviceError::NameTaken => (StatusCode::CONFLICT, "CONFLICT"),
                    DeviceError::NotAllowedToUpdate => (StatusCode::FORBIDDEN, "FORBIDDEN"),
                };
                (status, code, err.to_string())
            }

            // --- Database errors ---
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }

            // --- Metrics proxy ---
            AppError::Metrics(err) => match err {
                MetricsError::NotConfigured => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "METRICS_UNAVAILABLE",
                    err.to_string(),
                ),
                MetricsError::Request(_) | MetricsError::ApiError { .. } => {
                    tracing::error!(error = %err, "Metrics backend failure");
                    (
                        StatusCode::BAD_GATEWAY,
                        "METRICS_ERROR",
                        "Metrics backend request failed".to_string(),
                    )
                }
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
