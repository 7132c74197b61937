// Authentication service - business logic layer

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{
    error::AuthError,
    models::{LoginRequest, NewUser, Role, SignupRequest, User, UserProfile, UserResponse, MIN_PASSWORD_LENGTH},
    password::PasswordService,
    repository::UserStore,
    token::TokenService,
};

/// A verified identity plus the session token minted for it
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub user: UserResponse,
    pub token: String,
}

/// Authentication service coordinating the credential store, the password
/// hasher and the token issuer
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Register a new user and open a session for them
    pub async fn signup(&self, request: SignupRequest) -> Result<IssuedSession, AuthError> {
        // Early lookup gives the friendly error; the store's uniqueness
        // constraint still catches a concurrent signup racing past it.
        if self.users.find_by_email(&request.email).await?.is_some() {
            debug!("Signup rejected, email already registered");
            return Err(AuthError::DuplicateEmail);
        }

        // Counted in characters, so each emoji is one
        if request.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword);
        }

        request
            .validate()
            .map_err(|e| AuthError::InvalidUserData(e.to_string()))?;

        let role = match request.role.as_deref() {
            Some(raw) => raw.parse::<Role>().map_err(AuthError::InvalidUserData)?,
            None => Role::default(),
        };

        let password_hash = PasswordService::hash_password_async(request.password).await?;

        let user = self
            .users
            .insert(NewUser {
                name: request.name,
                email: request.email,
                password_hash,
                role,
            })
            .await?;

        let token = self.tokens.issue(user.id)?;
        info!("Registered user {} with role {}", user.id, user.role);

        Ok(IssuedSession {
            user: UserResponse::from(&user),
            token,
        })
    }

    /// Verify credentials and open a session
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, request: LoginRequest) -> Result<IssuedSession, AuthError> {
        let user = self.users.find_by_email(&request.email).await?;
        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());

        let password_ok = PasswordService::verify_password_async(request.password, stored_hash).await?;

        let user = match user {
            Some(user) if password_ok => user,
            _ => {
                debug!("Login rejected for submitted credentials");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let token = self.tokens.issue(user.id)?;
        info!("User {} logged in", user.id);

        Ok(IssuedSession {
            user: UserResponse::from(&user),
            token,
        })
    }

    /// Resolve a session token to its stored user
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let user_id = self.tokens.verify(token)?;

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UnknownSubject)
    }

    /// Stored user minus password hash
    pub async fn current_identity(&self, user_id: Uuid) -> Result<UserProfile, AuthError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or(AuthError::UnknownSubject)
    }
}
