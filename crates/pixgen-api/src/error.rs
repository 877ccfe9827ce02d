//! API error types.
//!
//! Status codes are part of the frontend contract inherited from the
//! original service: domain failures on the submission endpoints
//! (invalid input, unknown model, insufficient credit) all surface as
//! 411, provider and internal failures as 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pixgen_provider::ProviderError;
use pixgen_store::StoreError;
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Input incorrect: {0}")]
    Validation(String),

    #[error("Model not found")]
    ModelNotFound,

    #[error("Not enough credits")]
    InsufficientCredits,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A dispatched prompt came back without a job handle; the batch is
    /// aborted rather than persisted with a hole in it.
    #[error("Dispatch result mismatch: {0}")]
    DispatchMismatch(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Storage error: {0}")]
    Storage(StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            // Domain-failure signal the frontend expects.
            ApiError::Validation(_) | ApiError::ModelNotFound | ApiError::InsufficientCredits => {
                StatusCode::LENGTH_REQUIRED
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DispatchMismatch(_)
            | ApiError::Provider(_)
            | ApiError::Storage(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if err.is_insufficient_credits() {
            ApiError::InsufficientCredits
        } else {
            ApiError::Storage(err)
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't leak provider/storage internals to callers in production.
        let message = match &self {
            ApiError::DispatchMismatch(_)
            | ApiError::Provider(_)
            | ApiError::Storage(_)
            | ApiError::Internal(_) => {
                if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
                    "An internal error occurred".to_string()
                } else {
                    self.to_string()
                }
            }
            _ => self.to_string(),
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_failures_map_to_411() {
        for err in [
            ApiError::validation("bad"),
            ApiError::ModelNotFound,
            ApiError::InsufficientCredits,
        ] {
            assert_eq!(err.status_code(), StatusCode::LENGTH_REQUIRED);
        }
    }

    #[test]
    fn test_provider_and_internal_map_to_500() {
        let provider = ApiError::Provider(ProviderError::Unavailable("down".into()));
        assert_eq!(provider.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ApiError::DispatchMismatch("hole".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_insufficient_store_error_becomes_domain_error() {
        let err: ApiError = StoreError::InsufficientCredits {
            needed: 3,
            available: 1,
        }
        .into();
        assert!(matches!(err, ApiError::InsufficientCredits));
    }
}
