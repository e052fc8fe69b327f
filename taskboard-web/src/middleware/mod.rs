//! Middleware modules for the web server
//!
//! This module contains custom middleware for:
//! - Security headers
//! - Session resolution (cookie to caller)

pub mod security;
pub mod session;
