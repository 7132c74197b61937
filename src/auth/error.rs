// Authentication and authorization error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::auth::models::Role;
use crate::store::StoreError;

/// Generic body for every failed session check
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// Authentication and authorization error types
///
/// Session failures (`MissingToken`, `InvalidToken`, `ExpiredToken`,
/// `UnknownSubject`) are kept distinct for logging, but all render the same
/// 401 response so callers cannot tell them apart.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email is already taken")]
    DuplicateEmail,

    #[error("Password must be at least 6 characters long")]
    WeakPassword,

    #[error("Invalid user data: {0}")]
    InvalidUserData(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Missing session token")]
    MissingToken,

    #[error("Invalid session token")]
    InvalidToken,

    #[error("Session token has expired")]
    ExpiredToken,

    #[error("Session subject no longer exists")]
    UnknownSubject,

    #[error("Insufficient permissions: required role '{required}', user has role '{actual}'")]
    InsufficientPermissions { required: Role, actual: Role },

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token generation error: {0}")]
    TokenGeneration(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => AuthError::DuplicateEmail,
            other => AuthError::Database(other.to_string()),
        }
    }
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::DuplicateEmail
            | AuthError::WeakPassword
            | AuthError::InvalidUserData(_)
            | AuthError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::UnknownSubject => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions { .. } => StatusCode::FORBIDDEN,
            AuthError::PasswordHash(_)
            | AuthError::TokenGeneration(_)
            | AuthError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to send to clients
    pub fn error_message(&self) -> String {
        match self {
            AuthError::DuplicateEmail
            | AuthError::WeakPassword
            | AuthError::InvalidCredentials => self.to_string(),
            AuthError::InvalidUserData(_) => "Invalid user data".to_string(),
            AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::UnknownSubject => UNAUTHORIZED_MESSAGE.to_string(),
            AuthError::InsufficientPermissions { required, .. } => {
                format!("Insufficient permissions: required role '{}'", required)
            }
            AuthError::PasswordHash(_)
            | AuthError::TokenGeneration(_)
            | AuthError::Database(_) => "Internal Server Error".to_string(),
        }
    }

    /// True for the failures that collapse into the uniform 401
    pub fn is_session_failure(&self) -> bool {
        self.status_code() == StatusCode::UNAUTHORIZED
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::MissingToken => debug!("Rejected request: {}", self),
            AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::UnknownSubject
            | AuthError::InsufficientPermissions { .. } => warn!("Rejected request: {}", self),
            AuthError::PasswordHash(_) | AuthError::TokenGeneration(_) | AuthError::Database(_) => {
                error!("Internal error in auth: {}", self)
            }
            _ => debug!("Auth request failed: {}", self),
        }

        let body = Json(json!({
            "error": self.error_message(),
        }));

        (self.status_code(), body).into_response()
    }
}
