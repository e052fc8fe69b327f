//! Caller context and route guards
//!
//! # Permission Model
//!
//! Taskboard has two roles:
//!
//! 1. **Admin**: creates, reassigns and deletes tasks; sees every task
//! 2. **Worker** (non-admin): sees and completes the tasks assigned to them
//!
//! The session only names the user. `resolve_caller` turns that name into an
//! [`AuthContext`] by re-reading the user row, so a role change or a removed
//! account takes effect on the next request.
//!
//! Guards are pure predicates returning `Result<_, AuthzError>`; the web
//! layer decides how each error is presented.
//!
//! # Example
//!
//! ```no_run
//! use taskboard_shared::auth::authorization::{require_admin, resolve_caller};
//! use taskboard_shared::auth::session::SessionIdentity;
//! use sqlx::SqlitePool;
//!
//! # async fn example(pool: SqlitePool, identity: SessionIdentity) -> Result<(), Box<dyn std::error::Error>> {
//! let caller = resolve_caller(&pool, &identity).await?;
//! let admin = require_admin(caller.as_ref())?;
//! println!("{} may manage tasks", admin.username);
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use super::session::SessionIdentity;
use crate::models::{task::Task, user::User, UserId};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// No valid session
    #[error("Not authenticated")]
    Unauthenticated,

    /// Valid session, insufficient role or not the owner
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

/// Authenticated caller of the current request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    /// Caller's user ID
    pub user_id: UserId,

    /// Caller's username
    pub username: String,

    /// Role as stored in the credential store
    pub is_admin: bool,
}

impl AuthContext {
    /// Creates the context from a stored user
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Resolves a session identity against the credential store
///
/// Returns `None` if the user no longer exists.
pub async fn resolve_caller(
    pool: &SqlitePool,
    identity: &SessionIdentity,
) -> Result<Option<AuthContext>, sqlx::Error> {
    let user = User::find_by_id(pool, identity.user_id).await?;

    if user.is_none() {
        debug!(user_id = identity.user_id, "Session refers to a missing user");
    }

    Ok(user.as_ref().map(AuthContext::from_user))
}

/// Requires a session
///
/// # Errors
///
/// Returns `AuthzError::Unauthenticated` if there is no caller
pub fn require_authenticated(caller: Option<&AuthContext>) -> Result<&AuthContext, AuthzError> {
    caller.ok_or(AuthzError::Unauthenticated)
}

/// Requires a session belonging to an admin
///
/// # Errors
///
/// - `AuthzError::Unauthenticated` if there is no caller
/// - `AuthzError::Forbidden` if the caller is not an admin
pub fn require_admin(caller: Option<&AuthContext>) -> Result<&AuthContext, AuthzError> {
    let caller = require_authenticated(caller)?;

    if !caller.is_admin {
        return Err(AuthzError::Forbidden(
            "Administrator role required".to_string(),
        ));
    }

    Ok(caller)
}

/// Requires the caller to be the assignee of `task`
///
/// Admins are not exempt: only the assignee completes a task.
pub fn require_task_owner(caller: &AuthContext, task: &Task) -> Result<(), AuthzError> {
    if task.assigned_to != caller.user_id {
        return Err(AuthzError::Forbidden(format!(
            "Task {} is not assigned to user {}",
            task.id, caller.user_id
        )));
    }

    Ok(())
}
