use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use c2d_core::CoreError;

#[derive(Debug)]
pub enum AppError {
    Core(CoreError),
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Core(CoreError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg),
            AppError::Core(CoreError::InvalidArgument(msg)) => (StatusCode::BAD_REQUEST, msg),
            AppError::Core(CoreError::InvalidPayload(msg)) => (StatusCode::BAD_REQUEST, msg),
            AppError::Core(CoreError::Unauthorized(msg)) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Core(CoreError::Gateway(msg)) => {
                tracing::error!("Gateway failure: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::Core(CoreError::Storage(msg)) => {
                // 503 tells a gateway the failure is transient and the
                // delivery is worth retrying.
                tracing::error!("Storage failure: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable".to_string(),
                )
            }
            AppError::Internal(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        Self::Core(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}
