//! HTML rendering
//!
//! Templates are compiled into the binary and loaded into a single `Tera`
//! instance at startup. Autoescaping is on for every `.html` template, so
//! user-supplied titles, descriptions and usernames are escaped on output.

use crate::error::{ValidationErrorDetail, WebResult};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use taskboard_shared::{
    auth::authorization::AuthContext,
    models::{task::Task, TaskId, UserId},
};
use tera::{Context, Tera};

/// Display format for timestamps
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

const TEMPLATES: [(&str, &str); 8] = [
    ("base.html", include_str!("../templates/base.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("register.html", include_str!("../templates/register.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("dashboard.html", include_str!("../templates/dashboard.html")),
    ("dashboard_admin.html", include_str!("../templates/dashboard_admin.html")),
    ("assign_task.html", include_str!("../templates/assign_task.html")),
    ("reassign_task.html", include_str!("../templates/reassign_task.html")),
];

/// Builds the template engine with every page template
///
/// # Errors
///
/// Returns an error if a template fails to parse.
pub fn load_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.to_vec())?;
    Ok(tera)
}

/// Starts a template context carrying the current caller, if any
pub fn page_context(caller: Option<&AuthContext>) -> Context {
    let mut context = Context::new();
    if let Some(caller) = caller {
        context.insert("caller", caller);
    }
    context
}

/// Adds form error messages to a context
pub fn with_errors(mut context: Context, errors: &[ValidationErrorDetail]) -> Context {
    context.insert("errors", errors);
    context
}

/// Renders a template into an HTML response with the given status
pub fn render(
    tera: &Tera,
    template: &str,
    context: &Context,
    status: StatusCode,
) -> WebResult<Response> {
    let body = tera.render(template, context)?;
    Ok((status, Html(body)).into_response())
}

/// A task as shown on the dashboards
#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub assigned_to: UserId,
    /// Assignee's username, or `#id` if it could not be resolved
    pub assignee: String,
    pub created_at: String,
    pub due_date: String,
    pub completed: bool,
    pub completion_date: Option<String>,
    pub state: &'static str,
    pub overdue: bool,
}

impl TaskView {
    /// Prepares a task for display at time `now`
    pub fn new(task: &Task, assignee: Option<&str>, now: DateTime<Utc>) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            assigned_to: task.assigned_to,
            assignee: assignee
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{}", task.assigned_to)),
            created_at: format_date(&task.created_at),
            due_date: format_date(&task.due_date),
            completed: task.completed,
            completion_date: task.completion_date.as_ref().map(format_date),
            state: task.state().as_str(),
            overdue: task.is_overdue(now),
        }
    }

    /// Prepares a list of tasks, resolving assignee names from `names`
    pub fn list<'a>(
        tasks: &[Task],
        names: impl IntoIterator<Item = (UserId, &'a str)>,
        now: DateTime<Utc>,
    ) -> Vec<Self> {
        let names: HashMap<UserId, &str> = names.into_iter().collect();

        tasks
            .iter()
            .map(|task| Self::new(task, names.get(&task.assigned_to).copied(), now))
            .collect()
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.format(DATE_FORMAT).to_string()
}
