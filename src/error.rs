use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::repository::RepoError;

/// Message shared by every credential failure, whether the account is missing or the
/// password is wrong.
pub const INVALID_CREDENTIALS: &str = "Invalid username/email or password";

/// ApiError
///
/// The single error type returned by handlers and the auth/profile services.
/// Rendered as `(status, {"error": message})`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{}", INVALID_CREDENTIALS)]
    InvalidCredentials,

    #[error("No role found for this account")]
    NoRoleFound,

    #[error("no session")]
    Unauthorized,

    #[error("access denied")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NoRoleFound | ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(detail) => tracing::error!("internal error: {}", detail),
            ApiError::Validation(msg) => tracing::debug!("validation error: {}", msg),
            other => tracing::warn!("request rejected: {}", other),
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(what) => ApiError::NotFound(what),
            RepoError::Conflict(msg) => ApiError::Conflict(msg),
            // Raised deliberately by procedures/triggers with a user-facing message.
            RepoError::Rejected(msg) => ApiError::Validation(msg),
            RepoError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}
