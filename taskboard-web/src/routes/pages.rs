//! Landing page

use super::DASHBOARD_PATH;
use crate::{app::AppState, error::WebResult, middleware::session::Caller, views};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension,
};

/// `GET /`: dashboard for signed-in users, landing page otherwise
pub async fn home(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> WebResult<Response> {
    if caller.context().is_some() {
        return Ok(Redirect::to(DASHBOARD_PATH).into_response());
    }

    views::render(
        &state.templates,
        "index.html",
        &views::page_context(None),
        StatusCode::OK,
    )
}
