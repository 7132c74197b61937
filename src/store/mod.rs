// Persistence layer shared by the user and post repositories

pub mod memory;

pub use memory::InMemoryStore;

use thiserror::Error;

/// Storage failures surfaced by repository implementations
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write; carries the constraint name
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    /// A stored record could not be mapped back into a domain type
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Conflict(
                    db_err.constraint().unwrap_or("unique").to_string(),
                );
            }
        }
        StoreError::Database(err.to_string())
    }
}
