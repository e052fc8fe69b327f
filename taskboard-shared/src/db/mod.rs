//! Database layer for Taskboard
//!
//! This module provides SQLite connection pooling and the startup schema
//! bootstrap.
//!
//! # Modules
//!
//! - `pool`: SQLite connection pool management with health checks
//! - `schema`: Creates the `user` and `task` tables if they are absent
//! - Models are in the `models` module at crate root level
//!
//! # Example
//!
//! ```no_run
//! use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
//! use taskboard_shared::db::schema::ensure_schema;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig {
//!         url: "sqlite://taskboard.db".to_string(),
//!         ..Default::default()
//!     };
//!
//!     let pool = create_pool(config).await?;
//!     ensure_schema(&pool).await?;
//!     Ok(())
//! }
//! ```

pub mod pool;
pub mod schema;
