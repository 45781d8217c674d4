//! API error type and HTTP status mapping.
//!
//! Internal failures are deliberately opaque to the caller: the body carries
//! a fixed message while the underlying error lands in the server log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use tillpoint_core::CoreError;
use tillpoint_db::{DbError, WorkflowError};

/// API errors with their HTTP status mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// Logged server-side; the response body stays opaque.
    #[error("internal error")]
    Internal(String),
}

/// JSON error body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Internal(detail) => {
                error!(detail = %detail, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal error".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorBody {
                error: message,
                code,
            }),
        )
            .into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(_)
            | CoreError::LocationNotFound(_)
            | CoreError::OrderNotFound(_) => ApiError::NotFound(err.to_string()),

            CoreError::InsufficientStock { .. }
            | CoreError::NoOpenDrawer { .. }
            | CoreError::DrawerAlreadyOpen { .. }
            | CoreError::DrawerClosed(_)
            | CoreError::InsufficientDrawerCash { .. }
            | CoreError::InvalidPaymentType(_)
            | CoreError::InvalidTransactionType(_)
            | CoreError::InvalidStockAction(_)
            | CoreError::Validation(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Core(core) => core.into(),
            WorkflowError::Db(db) => db.into(),
        }
    }
}

/// Result type alias for handler functions.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        let err: ApiError = CoreError::ProductNotFound(7).into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = CoreError::InsufficientStock {
            product_id: 7,
            available: 1,
            requested: 2,
        }
        .into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_db_error_mapping() {
        let err: ApiError = DbError::not_found("Product", 7).into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = DbError::Internal("boom".to_string()).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
