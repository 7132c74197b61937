// Credential store: user lookups and inserts

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::models::{NewUser, User, UserRow};
use crate::store::StoreError;

/// Operations the auth flow needs from the credential store
///
/// Implementations must reject a second user with an already stored email
/// with `StoreError::Conflict`, independently of any lookup done by callers.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by exact (case-sensitive) email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
}

/// Postgres-backed user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_user(row: UserRow) -> Result<User, StoreError> {
    User::try_from(row).map_err(StoreError::Corrupt)
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash, role, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_user).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_user).transpose()
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        // users.email carries a UNIQUE constraint; a violation comes back as Conflict
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, password_hash, role, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await?;

        into_user(row)
    }
}
