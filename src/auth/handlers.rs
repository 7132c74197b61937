// HTTP handlers for authentication endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, StatusCode},
    Json,
};
use tracing::debug;

use crate::auth::{
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{LoginRequest, MessageResponse, SignupRequest, UserProfile, UserResponse},
};
use crate::error::ErrorResponse;
use crate::AppState;

type WithSessionCookie<T> = ([(header::HeaderName, HeaderValue); 1], Json<T>);

/// Register a new user and start a session
/// POST /api/auth/signup
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created, session cookie set", body = UserResponse),
        (status = 400, description = "Duplicate email, weak password or invalid user data", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn signup_handler(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, WithSessionCookie<UserResponse>), AuthError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!("Unusable signup body: {}", rejection.body_text());
        AuthError::InvalidUserData(rejection.body_text())
    })?;

    let session = state.auth.signup(request).await?;
    let cookie = state.cookies.issue(&session.token)?;

    Ok((
        StatusCode::CREATED,
        ([(header::SET_COOKIE, cookie)], Json(session.user)),
    ))
}

/// Log in with email and password
/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = UserResponse),
        (status = 400, description = "Invalid username or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<WithSessionCookie<UserResponse>, AuthError> {
    // Incomplete credentials get the same answer as wrong ones
    let Json(request) = payload.map_err(|rejection| {
        debug!("Unusable login body: {}", rejection.body_text());
        AuthError::InvalidCredentials
    })?;

    let session = state.auth.login(request).await?;
    let cookie = state.cookies.issue(&session.token)?;

    Ok(([(header::SET_COOKIE, cookie)], Json(session.user)))
}

/// Drop the session cookie; succeeds whether or not a session existed
/// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = MessageResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn logout_handler(
    State(state): State<AppState>,
) -> Result<WithSessionCookie<MessageResponse>, AuthError> {
    let cookie = state.cookies.clear()?;

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse::new("Logged out successfully")),
    ))
}

/// Current user for a valid session (protected endpoint)
/// GET /api/auth/get
#[utoipa::path(
    get,
    path = "/api/auth/get",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn me_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserProfile>, AuthError> {
    let profile = state.auth.current_identity(user.id).await?;
    Ok(Json(profile))
}
