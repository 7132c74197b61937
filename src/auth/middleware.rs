// Authentication middleware for protected routes

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::{
    error::AuthError,
    models::{Role, User},
};
use crate::AppState;

/// Identity resolved from the session cookie, without the password hash.
/// Lives in the request extensions for the duration of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Session gate: cookie -> token -> user, or a uniform 401
///
/// Mount with `axum::middleware::from_fn_with_state` on routers whose
/// handlers need an identity.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let endpoint = request.uri().path().to_string();

    let token = state.cookies.extract(request.headers()).ok_or_else(|| {
        debug!("No session cookie on request to {}", endpoint);
        AuthError::MissingToken
    })?;

    let user = state.auth.authenticate(&token).await.map_err(|e| {
        if e.is_session_failure() {
            warn!("Session rejected for {}: {}", endpoint, e);
        }
        e
    })?;

    debug!("Session accepted: user_id={}, endpoint={}", user.id, endpoint);
    request.extensions_mut().insert(AuthenticatedUser::from(user));

    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only present when require_session ran for this request
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}

/// Role requirement checked against an already authenticated user
#[derive(Debug, Clone, Copy)]
pub struct RequireRole {
    required_role: Role,
}

impl RequireRole {
    pub fn new(required_role: Role) -> Self {
        Self { required_role }
    }

    pub fn admin() -> Self {
        Self::new(Role::Admin)
    }

    pub fn check(&self, user: &AuthenticatedUser) -> Result<(), AuthError> {
        if user.role != self.required_role {
            warn!(
                "Authorization failed: user_id={}, required_role={}, actual_role={}",
                user.id, self.required_role, user.role
            );
            return Err(AuthError::InsufficientPermissions {
                required: self.required_role,
                actual: user.role,
            });
        }
        Ok(())
    }
}
