//! Session resolution middleware
//!
//! Runs before every page handler. Reads the session cookie, validates the
//! signed token and re-reads the user from the credential store, then
//! stores the result as a [`Caller`] request extension.
//!
//! A missing, tampered or expired cookie, or one naming a user that no
//! longer exists, yields `Caller(None)`. Handlers decide whether that is
//! acceptable by calling the authorization guards.

use crate::{app::AppState, error::WebError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use taskboard_shared::auth::authorization::{resolve_caller, AuthContext};

/// The authenticated caller of the current request, if any
#[derive(Debug, Clone, Default)]
pub struct Caller(pub Option<AuthContext>);

impl Caller {
    /// Borrowed form accepted by the authorization guards
    pub fn context(&self) -> Option<&AuthContext> {
        self.0.as_ref()
    }
}

/// Resolves the session cookie into a [`Caller`] extension
pub async fn session_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let caller = match state.sessions.current_user(req.headers()) {
        Some(identity) => resolve_caller(&state.db, &identity).await?,
        None => None,
    };

    if let Some(caller) = &caller {
        tracing::debug!(user_id = caller.user_id, is_admin = caller.is_admin, "Resolved session");
    }

    req.extensions_mut().insert(Caller(caller));

    Ok(next.run(req).await)
}
