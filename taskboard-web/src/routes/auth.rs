//! Authentication endpoints
//!
//! - `GET|POST /register` - Create a worker account
//! - `GET|POST /login` - Start a session
//! - `GET /logout` - End the session
//!
//! Rejected submissions re-render the form with the entered username and a
//! list of messages:
//!
//! - `409 Conflict`: username taken
//! - `401 Unauthorized`: unknown username or wrong password
//! - `422 Unprocessable Entity`: missing or oversized fields

use super::DASHBOARD_PATH;
use crate::{
    app::AppState,
    error::{validation_details, ValidationErrorDetail, WebResult},
    middleware::session::Caller,
    views,
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use taskboard_shared::{error::StoreError, models::user::User};
use tracing::{info, warn};
use validator::Validate;

/// Registration form
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterForm {
    /// Desired username
    #[validate(length(min = 1, max = 150, message = "Username must be 1 to 150 characters"))]
    pub username: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login form
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

fn form_page(
    state: &AppState,
    caller: &Caller,
    template: &str,
    username: &str,
    errors: &[ValidationErrorDetail],
    status: StatusCode,
) -> WebResult<Response> {
    let mut context = views::with_errors(views::page_context(caller.context()), errors);
    context.insert("username", username);
    views::render(&state.templates, template, &context, status)
}

/// `GET /register`
pub async fn register_form(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> WebResult<Response> {
    form_page(&state, &caller, "register.html", "", &[], StatusCode::OK)
}

/// `POST /register`: creates a non-admin user, then redirects to login
///
/// Registration does not start a session.
pub async fn register(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Form(mut form): Form<RegisterForm>,
) -> WebResult<Response> {
    form.username = form.username.trim().to_string();

    if let Err(errors) = form.validate() {
        return form_page(
            &state,
            &caller,
            "register.html",
            &form.username,
            &validation_details(&errors),
            StatusCode::UNPROCESSABLE_ENTITY,
        );
    }

    match User::register(&state.db, &form.username, &form.password).await {
        Ok(_) => Ok(Redirect::to("/login").into_response()),
        Err(StoreError::DuplicateUsername(username)) => {
            warn!(username = %username, "Registration with a taken username");
            form_page(
                &state,
                &caller,
                "register.html",
                &form.username,
                &[ValidationErrorDetail::new(
                    "username",
                    "That username is already taken",
                )],
                StatusCode::CONFLICT,
            )
        }
        Err(StoreError::InvalidInput(message)) => form_page(
            &state,
            &caller,
            "register.html",
            &form.username,
            &[ValidationErrorDetail::new("username", message)],
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
        Err(e) => Err(e.into()),
    }
}

/// `GET /login`
pub async fn login_form(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> WebResult<Response> {
    form_page(&state, &caller, "login.html", "", &[], StatusCode::OK)
}

/// `POST /login`: sets the session cookie and redirects to the dashboard
pub async fn login(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Form(mut form): Form<LoginForm>,
) -> WebResult<Response> {
    form.username = form.username.trim().to_string();

    if let Err(errors) = form.validate() {
        return form_page(
            &state,
            &caller,
            "login.html",
            &form.username,
            &validation_details(&errors),
            StatusCode::UNPROCESSABLE_ENTITY,
        );
    }

    let Some(user) = User::authenticate(&state.db, &form.username, &form.password).await? else {
        warn!(username = %form.username, "Failed login attempt");
        return form_page(
            &state,
            &caller,
            "login.html",
            &form.username,
            &[ValidationErrorDetail::new(
                "form",
                "Invalid username or password",
            )],
            StatusCode::UNAUTHORIZED,
        );
    };

    let cookie = state.sessions.start_session(&user)?;
    info!(user_id = user.id, is_admin = user.is_admin, "User logged in");

    Ok((
        [(header::SET_COOKIE, cookie.to_string())],
        Redirect::to(DASHBOARD_PATH),
    )
        .into_response())
}

/// `GET /logout`: clears the session cookie and redirects to the landing page
pub async fn logout(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Response {
    if let Some(caller) = caller.context() {
        info!(user_id = caller.user_id, "User logged out");
    }

    (
        [(header::SET_COOKIE, state.sessions.end_session().to_string())],
        Redirect::to("/"),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_form_validation() {
        let form = RegisterForm {
            username: "alice".to_string(),
            password: "pw1".to_string(),
        };
        assert!(form.validate().is_ok());

        let form = RegisterForm::default();
        let details = validation_details(&form.validate().unwrap_err());
        let fields: Vec<_> = details.iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["password", "username"]);
    }

    #[test]
    fn test_register_form_rejects_long_username() {
        let form = RegisterForm {
            username: "a".repeat(151),
            password: "pw1".to_string(),
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_login_form_requires_both_fields() {
        let form = LoginForm {
            username: "alice".to_string(),
            password: String::new(),
        };
        let details = validation_details(&form.validate().unwrap_err());
        assert_eq!(details, vec![ValidationErrorDetail::new("password", "Password is required")]);
    }
}
