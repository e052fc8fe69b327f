//! Store error taxonomy
//!
//! Every fallible operation on the credential store and the task store
//! returns `StoreError`. The web layer maps each variant to an HTTP response.

use crate::auth::password::PasswordError;

/// Error type for credential and task store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No row with the given id
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Username already taken (unique constraint violation)
    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    /// Input rejected before reaching storage
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Password hashing failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Any other storage failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Builds a `NotFound` error for a user id
    pub fn user_not_found(id: i64) -> Self {
        StoreError::NotFound { entity: "User", id }
    }

    /// Builds a `NotFound` error for a task id
    pub fn task_not_found(id: i64) -> Self {
        StoreError::NotFound { entity: "Task", id }
    }

    /// Whether this error means the addressed row does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
