// Errors surfaced to dashboard clients
use crate::application::session::SessionError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid email or password")]
    Unauthorized,

    #[error("machine {0} not found")]
    NotFound(String),

    #[error("factory API unavailable: {0}")]
    Upstream(String),

    #[error("failed to encode response")]
    Encoding(StatusCode),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidCredentials => ApiError::Unauthorized,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Upstream(format!("{:#}", err))
    }
}

impl From<StatusCode> for ApiError {
    fn from(status: StatusCode) -> Self {
        ApiError::Encoding(status)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(detail) => {
                tracing::warn!("Upstream request failed: {}", detail);
                StatusCode::BAD_GATEWAY
            }
            ApiError::Encoding(status) => *status,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
