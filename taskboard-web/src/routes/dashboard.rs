//! Role-based dashboard
//!
//! Admins see every task plus the users that can receive tasks. Workers see
//! only the tasks assigned to them.

use crate::{
    app::AppState,
    error::WebResult,
    middleware::session::Caller,
    views::{self, TaskView},
};
use axum::{extract::State, http::StatusCode, response::Response, Extension};
use chrono::Utc;
use taskboard_shared::{
    auth::authorization::require_authenticated,
    models::{task::Task, user::User},
};

/// `GET /dashboard`
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> WebResult<Response> {
    let caller = require_authenticated(caller.context())?;
    let now = Utc::now();
    let mut context = views::page_context(Some(caller));

    if caller.is_admin {
        let tasks = Task::list_all(&state.db).await?;
        let everyone = User::list_all(&state.db).await?;
        let workers = User::list_workers(&state.db).await?;

        let names = everyone.iter().map(|user| (user.id, user.username.as_str()));

        context.insert("tasks", &TaskView::list(&tasks, names, now));
        context.insert("users", &workers);

        views::render(&state.templates, "dashboard_admin.html", &context, StatusCode::OK)
    } else {
        let tasks = Task::list_for_user(&state.db, caller.user_id).await?;
        let names = [(caller.user_id, caller.username.as_str())];

        context.insert("tasks", &TaskView::list(&tasks, names, now));

        views::render(&state.templates, "dashboard.html", &context, StatusCode::OK)
    }
}
