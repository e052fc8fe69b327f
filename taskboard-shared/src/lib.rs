//! # Taskboard Shared Library
//!
//! This crate contains the storage layer and authentication primitives used
//! by the Taskboard web server.
//!
//! ## Module Organization
//!
//! - `models`: Credential store (users) and task store (tasks)
//! - `auth`: Password hashing, signed sessions and authorization guards
//! - `db`: SQLite connection pool and schema bootstrap
//! - `error`: Store error taxonomy

pub mod auth;
pub mod db;
pub mod error;
pub mod models;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
