// Error handling module for the blog API
// Centralized error type for the post endpoints and HTTP response conversion

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::auth::AuthError;
use crate::store::StoreError;

/// Body of every error response: `{ "error": "<message>" }`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Post not found")]
    pub error: String,
}

/// Main error type for non-auth handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body failed validation (400)
    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Body missing, not JSON, or not the expected shape (400)
    #[error("unusable request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    /// Referenced entity does not exist (404)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Session or permission failure; rendered exactly as the auth layer renders it
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Storage failure (500, details logged only)
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Auth(err) => err.status_code(),
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match self {
            ApiError::Auth(err) => return err.into_response(),
            ApiError::Validation(ref errors) => {
                debug!("Validation error: {:?}", errors);
                "Invalid request data".to_string()
            }
            ApiError::InvalidBody(ref rejection) => {
                debug!("Rejected request body: {}", rejection.body_text());
                "Invalid request data".to_string()
            }
            ApiError::NotFound(resource) => {
                debug!("{} not found", resource);
                format!("{} not found", resource)
            }
            ApiError::Store(ref err) => {
                error!("Store error: {}", err);
                "Internal Server Error".to_string()
            }
        };

        let status = self.status_code();
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
