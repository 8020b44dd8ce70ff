use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error returned by handlers. Every variant converts to a
/// JSON `{"msg": ...}` body at the HTTP boundary; server-side failures are
/// logged and collapsed to a generic message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Auth(String),

    #[error("upstream failure: {0}")]
    Upstream(anyhow::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::InvalidCredentials => {
                (StatusCode::BAD_REQUEST, "Invalid credentials".to_string())
            }
            // The wire contract reports duplicate emails as 400, not 409.
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Upstream(e) => {
                tracing::error!(error = ?e, "upstream failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
            ApiError::Internal(e) => {
                tracing::error!(error = ?e, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };

        (status, Json(json!({ "msg": msg }))).into_response()
    }
}
