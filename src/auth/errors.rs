//! Auth failure taxonomy and its mapping onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::auth::repo::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("User not found")]
    NotFound,

    #[error("{0}")]
    Validation(&'static str),

    #[error("Service temporarily unavailable")]
    StoreUnavailable(#[source] sqlx::Error),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => AuthError::DuplicateEmail,
            StoreError::Unavailable(e) => AuthError::StoreUnavailable(e),
        }
    }
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::DuplicateEmail => StatusCode::CONFLICT,
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::NotFound => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::DuplicateEmail => "EMAIL_EXISTS",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::NotFound => "USER_NOT_FOUND",
            AuthError::Validation(_) => "VALIDATION",
            AuthError::StoreUnavailable(_) => "UNAVAILABLE",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// JSON error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::StoreUnavailable(e) => error!(error = %e, "user store unavailable"),
            AuthError::Internal(e) => error!(error = ?e, "internal auth error"),
            _ => {}
        }

        let body = ErrorBody {
            error: self.to_string(),
            code: self.code().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
