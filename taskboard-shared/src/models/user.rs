//! User model and credential store operations
//!
//! Users are created by registration (never admins) or by the startup admin
//! bootstrap. No exposed operation updates or deletes a user.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE user (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     username TEXT NOT NULL UNIQUE,
//!     password_hash TEXT NOT NULL,
//!     is_admin BOOLEAN NOT NULL DEFAULT 0
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use taskboard_shared::models::user::User;
//! use sqlx::SqlitePool;
//!
//! # async fn example(pool: SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//! let alice = User::register(&pool, "alice", "pw1").await?;
//!
//! let found = User::authenticate(&pool, "alice", "pw1").await?;
//! assert_eq!(found.map(|u| u.id), Some(alice.id));
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::UserId;
use crate::auth::password;
use crate::error::StoreError;

/// User model representing an account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: UserId,

    /// Unique, non-empty login name
    pub username: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Whether the user manages tasks (admin) or works on them
    pub is_admin: bool,
}

/// Input for inserting a user row
///
/// Carries the hash, not the plaintext password.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Login name
    pub username: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Admin flag
    pub is_admin: bool,
}

impl User {
    /// Inserts a user row
    ///
    /// # Errors
    ///
    /// - `StoreError::InvalidInput` if the username is empty or has
    ///   surrounding whitespace
    /// - `StoreError::DuplicateUsername` if the username is taken
    pub async fn create(pool: &SqlitePool, data: CreateUser) -> Result<Self, StoreError> {
        let trimmed = data.username.trim();
        if trimmed.is_empty() {
            return Err(StoreError::InvalidInput("Username must not be empty".to_string()));
        }
        if trimmed.len() != data.username.len() {
            return Err(StoreError::InvalidInput(
                "Username must not start or end with whitespace".to_string(),
            ));
        }

        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO user (username, password_hash, is_admin)
            VALUES (?1, ?2, ?3)
            RETURNING id, username, password_hash, is_admin
            "#,
        )
        .bind(&data.username)
        .bind(&data.password_hash)
        .bind(data.is_admin)
        .fetch_one(pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::DuplicateUsername(data.username))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Registers a new non-admin user
    ///
    /// Hashes the password before storage. Uniqueness is enforced by the
    /// storage constraint, so two concurrent registrations of one name end
    /// with one row and one `DuplicateUsername`.
    pub async fn register(
        pool: &SqlitePool,
        username: &str,
        plaintext_password: &str,
    ) -> Result<Self, StoreError> {
        let password_hash = password::hash_password(plaintext_password)?;

        let user = Self::create(
            pool,
            CreateUser {
                username: username.to_string(),
                password_hash,
                is_admin: false,
            },
        )
        .await?;

        info!(user_id = user.id, username = %user.username, "Registered user");
        Ok(user)
    }

    /// Creates an admin account
    pub async fn create_admin(
        pool: &SqlitePool,
        username: &str,
        plaintext_password: &str,
    ) -> Result<Self, StoreError> {
        let password_hash = password::hash_password(plaintext_password)?;

        let user = Self::create(
            pool,
            CreateUser {
                username: username.to_string(),
                password_hash,
                is_admin: true,
            },
        )
        .await?;

        info!(user_id = user.id, username = %user.username, "Created admin account");
        Ok(user)
    }

    /// Makes sure an admin account with this username exists
    ///
    /// Returns the account and whether it was created by this call. An
    /// existing account is returned untouched, whatever its role.
    pub async fn ensure_admin(
        pool: &SqlitePool,
        username: &str,
        plaintext_password: &str,
    ) -> Result<(Self, bool), StoreError> {
        if let Some(existing) = Self::find_by_username(pool, username).await? {
            debug!(user_id = existing.id, "Admin bootstrap account already exists");
            return Ok((existing, false));
        }

        let admin = Self::create_admin(pool, username, plaintext_password).await?;
        Ok((admin, true))
    }

    /// Checks a username/password pair
    ///
    /// Returns the user only when the password verifies. Unknown usernames
    /// and wrong passwords both yield `None`.
    pub async fn authenticate(
        pool: &SqlitePool,
        username: &str,
        plaintext_password: &str,
    ) -> Result<Option<Self>, StoreError> {
        let Some(user) = Self::find_by_username(pool, username).await? else {
            debug!("Login attempt for unknown username");
            return Ok(None);
        };

        if password::verify_password(plaintext_password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            debug!(user_id = user.id, "Login attempt with wrong password");
            Ok(None)
        }
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &SqlitePool, id: UserId) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, is_admin
            FROM user
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Gets a user by ID, failing with `NotFound` if absent
    pub async fn get(pool: &SqlitePool, id: UserId) -> Result<Self, StoreError> {
        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| StoreError::user_not_found(id))
    }

    /// Finds a user by username (exact match)
    pub async fn find_by_username(
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, is_admin
            FROM user
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    /// Lists non-admin users, the candidates for task assignment
    pub async fn list_workers(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, is_admin
            FROM user
            WHERE is_admin = 0
            ORDER BY username
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Lists every user in id order
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, is_admin
            FROM user
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Counts rows with the given username (0 or 1)
    pub async fn count_by_username(pool: &SqlitePool, username: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user WHERE username = ?1")
            .bind(username)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Counts total number of users
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            is_admin: false,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "alice");
        assert!(json.get("password_hash").is_none());
    }

    // Store operations are exercised against SQLite in tests/store_tests.rs
}
