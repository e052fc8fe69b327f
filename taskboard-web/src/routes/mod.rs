//! Page route handlers
//!
//! This module contains all route handlers organized by area:
//!
//! - `pages`: Landing page
//! - `auth`: Registration, login and logout
//! - `dashboard`: Role-based task listing
//! - `tasks`: Task lifecycle (assign, complete, reassign, delete)
//! - `health`: Health check endpoint
//!
//! All redirects are `303 See Other`.

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod pages;
pub mod tasks;

use crate::error::{WebError, WebResult};

/// Dashboard path, the landing spot after every successful action
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Parses an id taken from the path
///
/// Handlers call this after their guard, so a malformed id never reveals
/// more to an anonymous caller than a well-formed one.
pub(crate) fn parse_id(kind: &str, raw: &str) -> WebResult<i64> {
    raw.parse()
        .map_err(|_| WebError::NotFound(format!("{} {:?} not found", kind, raw)))
}
