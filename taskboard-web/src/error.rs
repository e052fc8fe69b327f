//! Error handling for the web server
//!
//! This module provides a unified error type that maps to HTTP responses.
//! Handlers return `WebResult<T>`, and `?` converts store, session,
//! authorization and template errors into the right response.
//!
//! # Mapping
//!
//! | Variant | Response |
//! |---|---|
//! | `Unauthenticated`, `Forbidden` | `303 See Other` to `/login` |
//! | `NotFound` | `404` error page |
//! | `Conflict` | `409` error page |
//! | `ValidationError` | `422` error page listing the messages |
//! | `InternalError` | `500` generic page, details only in the log |
//!
//! Forms that can be corrected re-render themselves with their own status
//! instead of falling through to these generic pages.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use taskboard_shared::{
    auth::{authorization::AuthzError, session::SessionError},
    error::StoreError,
};
use validator::ValidationErrors;

/// Web result type alias
pub type WebResult<T> = Result<T, WebError>;

/// Where unauthenticated and forbidden requests are sent
pub const LOGIN_PATH: &str = "/login";

/// Unified web error type
#[derive(Debug)]
pub enum WebError {
    /// No valid session
    Unauthenticated,

    /// Session lacks the required role or ownership
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409), e.g. a taken username
    Conflict(String),

    /// Unprocessable entity (422)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl ValidationErrorDetail {
    /// Creates a detail for one field
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Flattens `validator` errors into field/message pairs, sorted by field
pub fn validation_details(errors: &ValidationErrors) -> Vec<ValidationErrorDetail> {
    let mut details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();

    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::Unauthenticated => write!(f, "Not authenticated"),
            WebError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            WebError::NotFound(msg) => write!(f, "Not found: {}", msg),
            WebError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            WebError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            WebError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for WebError {}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, title, messages) = match self {
            WebError::Unauthenticated => {
                tracing::debug!("Unauthenticated request, redirecting to login");
                return Redirect::to(LOGIN_PATH).into_response();
            }
            WebError::Forbidden(msg) => {
                tracing::warn!(reason = %msg, "Forbidden request, redirecting to login");
                return Redirect::to(LOGIN_PATH).into_response();
            }
            WebError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not found", vec![msg]),
            WebError::Conflict(msg) => (StatusCode::CONFLICT, "Conflict", vec![msg]),
            WebError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid input",
                errors.into_iter().map(|e| e.message).collect(),
            ),
            WebError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error",
                    vec!["An internal error occurred".to_string()],
                )
            }
        };

        (status, Html(error_page(status, title, &messages))).into_response()
    }
}

/// Standalone error page, usable even when templates fail to render
fn error_page(status: StatusCode, title: &str, messages: &[String]) -> String {
    let items: String = messages
        .iter()
        .map(|m| format!("<li>{}</li>", tera::escape_html(m)))
        .collect();

    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{code} {title}</title></head>\
         <body><h1>{code} {title}</h1><ul>{items}</ul><p><a href=\"/\">Home</a></p></body></html>",
        code = status.as_u16(),
        title = title,
        items = items,
    )
}

/// Convert store errors to web errors
impl From<StoreError> for WebError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => WebError::NotFound(err.to_string()),
            StoreError::DuplicateUsername(username) => {
                WebError::Conflict(format!("Username already exists: {}", username))
            }
            StoreError::InvalidInput(msg) => {
                WebError::ValidationError(vec![ValidationErrorDetail::new("form", msg)])
            }
            StoreError::Password(err) => {
                WebError::InternalError(format!("Password operation failed: {}", err))
            }
            StoreError::Database(err) => WebError::from(err),
        }
    }
}

/// Convert sqlx errors to web errors
impl From<sqlx::Error> for WebError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => WebError::NotFound("Resource not found".to_string()),
            _ => WebError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert authorization errors to web errors
impl From<AuthzError> for WebError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => WebError::Unauthenticated,
            AuthzError::Forbidden(msg) => WebError::Forbidden(msg),
        }
    }
}

/// Convert session errors to web errors
///
/// Invalid incoming tokens never get here: they simply yield no caller.
impl From<SessionError> for WebError {
    fn from(err: SessionError) -> Self {
        WebError::InternalError(format!("Session error: {}", err))
    }
}

/// Convert template errors to web errors
impl From<tera::Error> for WebError {
    fn from(err: tera::Error) -> Self {
        WebError::InternalError(format!("Template error: {:?}", err))
    }
}

/// Convert form validation errors to web errors
impl From<ValidationErrors> for WebError {
    fn from(err: ValidationErrors) -> Self {
        WebError::ValidationError(validation_details(&err))
    }
}
