//! Database models for Taskboard
//!
//! # Models
//!
//! - `user`: Credential store (accounts, password hashes, admin flag)
//! - `task`: Task store (assignment, due date, completion)
//!
//! # Example
//!
//! ```no_run
//! use taskboard_shared::models::user::User;
//! use taskboard_shared::models::task::{CreateTask, Task};
//! use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//!
//! let alice = User::register(&pool, "alice", "pw1").await?;
//! let task = Task::create(&pool, CreateTask {
//!     title: "T1".to_string(),
//!     description: "D1".to_string(),
//!     assigned_to: alice.id,
//!     duration: 3,
//! }).await?;
//! # Ok(())
//! # }
//! ```

pub mod task;
pub mod user;

/// Primary key of a user row
pub type UserId = i64;

/// Primary key of a task row
pub type TaskId = i64;
