use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::assistant::session::LifecycleError;
use crate::cv::actions::CvError;
use crate::cv::transfer::TransferError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("AI provider is not configured")]
    AiNotConfigured,

    #[error("Invalid import: {0}")]
    InvalidImport(#[from] TransferError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<CvError> for AppError {
    fn from(err: CvError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::SessionNotFound(_) | LifecycleError::MessageNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            LifecycleError::EmptyMessage | LifecycleError::NoProposal(_) => {
                AppError::Validation(err.to_string())
            }
            LifecycleError::Busy | LifecycleError::AlreadyResolved(_) | LifecycleError::Stale => {
                AppError::Conflict(err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::AiNotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                "AI_NOT_CONFIGURED",
                "AI provider is not configured. Please set AI_PROVIDER_BASE_URL, \
                 AI_PROVIDER_API_KEY, and AI_PROVIDER_MODEL."
                    .to_string(),
            ),
            AppError::InvalidImport(e) => {
                (StatusCode::BAD_REQUEST, "INVALID_IMPORT", e.to_string())
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::ChangeStatus;

    #[test]
    fn test_lifecycle_errors_map_to_status() {
        let cases = [
            (LifecycleError::Busy, StatusCode::CONFLICT),
            (
                LifecycleError::AlreadyResolved(ChangeStatus::Applied),
                StatusCode::CONFLICT,
            ),
            (LifecycleError::Stale, StatusCode::CONFLICT),
            (LifecycleError::EmptyMessage, StatusCode::BAD_REQUEST),
            (
                LifecycleError::SessionNotFound(uuid::Uuid::nil()),
                StatusCode::NOT_FOUND,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_ai_not_configured_is_503() {
        let response = AppError::AiNotConfigured.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_out_of_bounds_is_400() {
        let err = CvError::IndexOutOfBounds {
            section: "skills",
            index: 3,
            len: 1,
        };
        assert_eq!(
            AppError::from(err).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
