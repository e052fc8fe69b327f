//! Schema bootstrap
//!
//! Taskboard has no versioned migrations: the two tables are created at
//! startup when they are absent, and left alone when they already exist.
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
//!
//! CREATE TABLE task (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     title TEXT NOT NULL,
//!     description TEXT NOT NULL,
//!     assigned_to INTEGER NOT NULL REFERENCES user(id),
//!     created_at TEXT NOT NULL,
//!     duration INTEGER NOT NULL,
//!     due_date TEXT NOT NULL,
//!     completed BOOLEAN NOT NULL DEFAULT 0,
//!     completion_date TEXT
//! );
//! ```

use sqlx::SqlitePool;
use tracing::{debug, info};

const CREATE_USER_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS user (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE CHECK (length(username) > 0),
    password_hash TEXT NOT NULL,
    is_admin BOOLEAN NOT NULL DEFAULT 0
)
"#;

// completion_date is present exactly when completed is set
const CREATE_TASK_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS task (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    assigned_to INTEGER NOT NULL REFERENCES user(id),
    created_at TEXT NOT NULL,
    duration INTEGER NOT NULL CHECK (duration > 0),
    due_date TEXT NOT NULL,
    completed BOOLEAN NOT NULL DEFAULT 0,
    completion_date TEXT,
    CHECK ((completed = 0 AND completion_date IS NULL)
        OR (completed = 1 AND completion_date IS NOT NULL))
)
"#;

const CREATE_TASK_ASSIGNEE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_task_assigned_to ON task (assigned_to)";

/// Creates the `user` and `task` tables if they do not exist yet
///
/// Idempotent: running it against an initialized database is a no-op.
///
/// # Errors
///
/// Returns an error if any DDL statement fails.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!("Ensuring database schema");

    for statement in [CREATE_USER_TABLE, CREATE_TASK_TABLE, CREATE_TASK_ASSIGNEE_INDEX] {
        sqlx::query(statement).execute(pool).await?;
    }

    debug!("Database schema ready");
    Ok(())
}

/// Lists the application tables present in the database
pub async fn list_tables(pool: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
    let tables: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT name FROM sqlite_master
        WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(tables.into_iter().map(|(name,)| name).collect())
}
