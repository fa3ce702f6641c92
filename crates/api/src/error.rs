//! API Error Mapping

use auth::AuthError;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use ingest::IngestError;
use storage::StorageError;

/// Handler-level errors, mapped onto HTTP status codes with short text
/// reasons.
#[derive(Debug)]
pub enum ApiError {
    NotFound(&'static str),
    Unauthorized,
    Conflict(&'static str),
    InactiveUser,
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(reason) => (StatusCode::NOT_FOUND, reason).into_response(),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                "Could not validate credentials",
            )
                .into_response(),
            ApiError::Conflict(reason) => (StatusCode::CONFLICT, reason).into_response(),
            ApiError::InactiveUser => (StatusCode::BAD_REQUEST, "Inactive user").into_response(),
            ApiError::Internal(reason) => {
                (StatusCode::INTERNAL_SERVER_ERROR, reason).into_response()
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => ApiError::NotFound("Record not found"),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::InvalidToken => ApiError::Unauthorized,
            AuthError::UsernameTaken => ApiError::Conflict("Username already registered"),
            AuthError::Storage(err) => ApiError::Internal(err.to_string()),
        }
    }
}
