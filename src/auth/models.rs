// Authentication data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_not_blank;

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// User record as held by the credential store
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Row shape of the `users` table; role is stored as text
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse()?,
            created_at: row.created_at,
        })
    }
}

/// Data needed to persist a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Public identity returned by signup and login (excludes password_hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "Alice")]
    pub name: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Stored user minus password hash, returned by the identity endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

impl From<UserProfile> for UserResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            email: profile.email,
            role: profile.role,
        }
    }
}

/// Signup request DTO
///
/// Password length is checked by the service, after the duplicate-email
/// lookup, so it is deliberately not part of the derive rules here.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "Alice")]
    pub name: String,
    #[validate(email)]
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "secret1")]
    pub password: String,
    /// Defaults to `user` when omitted
    #[serde(default)]
    pub role: Option<String>,
}

/// Login request DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "secret1")]
    pub password: String,
}

/// Generic `{ "message": ... }` body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$v=19$hash".to_string(),
            role: Role::Admin,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_round_trips_through_text() {
        for role in [Role::User, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("Admin".parse::<Role>().is_err());
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::from_str::<Role>("\"user\"").unwrap(), Role::User);
    }

    #[test]
    fn test_public_views_never_include_password_hash() {
        let user = sample_user();

        let public = serde_json::to_value(UserResponse::from(&user)).unwrap();
        assert_eq!(public["name"], "Alice");
        assert_eq!(public["role"], "admin");
        assert!(public.get("password_hash").is_none());
        assert!(public.get("password").is_none());

        let profile = serde_json::to_value(UserProfile::from(user)).unwrap();
        assert!(profile.get("password_hash").is_none());
        assert!(profile.get("created_at").is_some());
    }

    #[test]
    fn test_user_row_with_unknown_role_is_rejected() {
        let row = UserRow {
            id: Uuid::new_v4(),
            name: "Mallory".to_string(),
            email: "m@x.com".to_string(),
            password_hash: "h".to_string(),
            role: "root".to_string(),
            created_at: Utc::now(),
        };
        assert!(User::try_from(row).is_err());
    }

    #[test]
    fn test_signup_request_validation() {
        let valid = SignupRequest {
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
            password: "secret1".to_string(),
            role: None,
        };
        assert!(valid.validate().is_ok());

        let bad_email = SignupRequest {
            email: "not-an-email".to_string(),
            ..valid.clone()
        };
        assert!(bad_email.validate().is_err());

        let blank_name = SignupRequest {
            name: "   ".to_string(),
            ..valid
        };
        assert!(blank_name.validate().is_err());
    }
}
