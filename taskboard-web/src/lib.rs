//! # Taskboard Web Server Library
//!
//! Server-rendered task assignment: admins assign tasks with a due date,
//! workers complete the tasks assigned to them.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Session resolution and security headers
//! - `routes`: Page route handlers
//! - `views`: Templates and view models

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod views;
