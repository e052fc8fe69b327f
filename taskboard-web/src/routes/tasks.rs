//! Task lifecycle endpoints
//!
//! ```text
//! open --complete (assignee)--> completed
//! open --reassign (admin)-----> open
//! any  --delete (admin)-------> removed
//! ```
//!
//! # Endpoints
//!
//! - `GET|POST /assign_task/:user_id` - Admin creates a task for a user
//! - `POST /delete_task/:task_id` - Admin deletes a task
//! - `POST /complete_task/:task_id` - Assignee completes a task
//! - `GET|POST /reassign_task/:task_id` - Admin moves a task to another user
//!
//! Non-admin sessions on admin routes are redirected to `/login` before
//! anything is read or written, even when the id in the path is malformed.
//! A missing user or task, or an id that is not a number, answers `404`.

use super::{parse_id, DASHBOARD_PATH};
use crate::{
    app::AppState,
    error::{validation_details, ValidationErrorDetail, WebResult},
    middleware::session::Caller,
    views::{self, TaskView},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use chrono::Utc;
use serde::Deserialize;
use taskboard_shared::{
    auth::authorization::{require_admin, require_authenticated, require_task_owner, AuthContext},
    error::StoreError,
    models::{
        task::{validate_duration, CreateTask, Task},
        user::User,
        TaskId, UserId,
    },
};
use tracing::{info, warn};
use validator::Validate;

/// Task creation form
///
/// `duration` stays a string until validation so that a non-numeric entry
/// becomes a form error instead of a rejected request.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct AssignTaskForm {
    #[validate(length(min = 1, max = 150, message = "Title must be 1 to 150 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 500, message = "Description must be 1 to 500 characters"))]
    pub description: String,

    #[validate(length(min = 1, message = "Duration is required"))]
    pub duration: String,
}

impl AssignTaskForm {
    /// Validates the form into a creation command for `assigned_to`
    pub fn to_command(
        &self,
        assigned_to: UserId,
    ) -> Result<CreateTask, Vec<ValidationErrorDetail>> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) => validation_details(&e),
        };

        let duration = match self.duration.trim().parse::<i64>() {
            Ok(days) => match validate_duration(days) {
                Ok(()) => Some(days),
                Err(e) => {
                    errors.push(ValidationErrorDetail::new("duration", store_message(e)));
                    None
                }
            },
            Err(_) if self.duration.trim().is_empty() => None,
            Err(_) => {
                errors.push(ValidationErrorDetail::new(
                    "duration",
                    "Duration must be a whole number of days",
                ));
                None
            }
        };

        match duration {
            Some(duration) if errors.is_empty() => Ok(CreateTask {
                title: self.title.clone(),
                description: self.description.clone(),
                assigned_to,
                duration,
            }),
            _ => Err(errors),
        }
    }
}

/// Reassignment form
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReassignTaskForm {
    pub new_user_id: String,
}

impl ReassignTaskForm {
    /// Parses the selected user id
    pub fn target(&self) -> Result<UserId, Vec<ValidationErrorDetail>> {
        self.new_user_id.trim().parse::<UserId>().map_err(|_| {
            vec![ValidationErrorDetail::new(
                "new_user_id",
                "Choose a user to reassign the task to",
            )]
        })
    }
}

fn store_message(err: StoreError) -> String {
    match err {
        StoreError::InvalidInput(message) => message,
        other => other.to_string(),
    }
}

fn assign_page(
    state: &AppState,
    caller: &AuthContext,
    target: &User,
    form: &AssignTaskForm,
    errors: &[ValidationErrorDetail],
    status: StatusCode,
) -> WebResult<Response> {
    let mut context = views::with_errors(views::page_context(Some(caller)), errors);
    context.insert("target", target);
    context.insert("title", &form.title);
    context.insert("description", &form.description);
    context.insert("duration", &form.duration);
    views::render(&state.templates, "assign_task.html", &context, status)
}

async fn reassign_page(
    state: &AppState,
    caller: &AuthContext,
    task: &Task,
    errors: &[ValidationErrorDetail],
    status: StatusCode,
) -> WebResult<Response> {
    let workers = User::list_workers(&state.db).await?;
    let assignee = User::find_by_id(&state.db, task.assigned_to).await?;

    let mut context = views::with_errors(views::page_context(Some(caller)), errors);
    context.insert(
        "task",
        &TaskView::new(task, assignee.as_ref().map(|u| u.username.as_str()), Utc::now()),
    );
    context.insert("users", &workers);
    views::render(&state.templates, "reassign_task.html", &context, status)
}

/// `GET /assign_task/:user_id`
pub async fn assign_task_form(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(user_id): Path<String>,
) -> WebResult<Response> {
    let caller = require_admin(caller.context())?;
    let user_id: UserId = parse_id("User", &user_id)?;
    let target = User::get(&state.db, user_id).await?;

    assign_page(
        &state,
        caller,
        &target,
        &AssignTaskForm::default(),
        &[],
        StatusCode::OK,
    )
}

/// `POST /assign_task/:user_id`: creates an open task due `duration` days from now
pub async fn assign_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(user_id): Path<String>,
    Form(form): Form<AssignTaskForm>,
) -> WebResult<Response> {
    let caller = require_admin(caller.context())?;
    let user_id: UserId = parse_id("User", &user_id)?;
    let target = User::get(&state.db, user_id).await?;

    let command = match form.to_command(target.id) {
        Ok(command) => command,
        Err(errors) => {
            return assign_page(
                &state,
                caller,
                &target,
                &form,
                &errors,
                StatusCode::UNPROCESSABLE_ENTITY,
            )
        }
    };

    match Task::create(&state.db, command).await {
        Ok(task) => {
            info!(task_id = task.id, user_id = target.id, admin_id = caller.user_id, "Task assigned");
            Ok(Redirect::to(DASHBOARD_PATH).into_response())
        }
        Err(StoreError::InvalidInput(message)) => assign_page(
            &state,
            caller,
            &target,
            &form,
            &[ValidationErrorDetail::new("form", message)],
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
        Err(e) => Err(e.into()),
    }
}

/// `POST /delete_task/:task_id`: removes the task whatever its state
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(task_id): Path<String>,
) -> WebResult<Redirect> {
    let caller = require_admin(caller.context())?;
    let task_id: TaskId = parse_id("Task", &task_id)?;

    Task::delete(&state.db, task_id).await?;
    info!(task_id, admin_id = caller.user_id, "Task deleted");

    Ok(Redirect::to(DASHBOARD_PATH))
}

/// `POST /complete_task/:task_id`
///
/// Only the assignee completes a task. Anyone else is sent back to the
/// dashboard and the task is left as it was.
pub async fn complete_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(task_id): Path<String>,
) -> WebResult<Redirect> {
    let caller = require_authenticated(caller.context())?;
    let task_id: TaskId = parse_id("Task", &task_id)?;
    let task = Task::get(&state.db, task_id).await?;

    if let Err(e) = require_task_owner(caller, &task) {
        warn!(task_id, user_id = caller.user_id, reason = %e, "Completion refused");
        return Ok(Redirect::to(DASHBOARD_PATH));
    }

    let task = Task::mark_complete(&state.db, task.id).await?;
    info!(task_id = task.id, user_id = caller.user_id, "Task completed");

    Ok(Redirect::to(DASHBOARD_PATH))
}

/// `GET /reassign_task/:task_id`: lists the users the task can move to
pub async fn reassign_task_form(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(task_id): Path<String>,
) -> WebResult<Response> {
    let caller = require_admin(caller.context())?;
    let task_id: TaskId = parse_id("Task", &task_id)?;
    let task = Task::get(&state.db, task_id).await?;

    reassign_page(&state, caller, &task, &[], StatusCode::OK).await
}

/// `POST /reassign_task/:task_id`: moves the task, keeping its due date
pub async fn reassign_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(task_id): Path<String>,
    Form(form): Form<ReassignTaskForm>,
) -> WebResult<Response> {
    let caller = require_admin(caller.context())?;
    let task_id: TaskId = parse_id("Task", &task_id)?;
    let task = Task::get(&state.db, task_id).await?;

    let new_user_id = match form.target() {
        Ok(id) => id,
        Err(errors) => {
            return reassign_page(&state, caller, &task, &errors, StatusCode::UNPROCESSABLE_ENTITY)
                .await
        }
    };

    match Task::reassign(&state.db, task.id, new_user_id).await {
        Ok(moved) => {
            info!(
                task_id = moved.id,
                from = task.assigned_to,
                to = moved.assigned_to,
                admin_id = caller.user_id,
                "Task reassigned"
            );
            Ok(Redirect::to(DASHBOARD_PATH).into_response())
        }
        Err(StoreError::InvalidInput(message)) => {
            reassign_page(
                &state,
                caller,
                &task,
                &[ValidationErrorDetail::new("new_user_id", message)],
                StatusCode::UNPROCESSABLE_ENTITY,
            )
            .await
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, description: &str, duration: &str) -> AssignTaskForm {
        AssignTaskForm {
            title: title.to_string(),
            description: description.to_string(),
            duration: duration.to_string(),
        }
    }

    fn fields(errors: &[ValidationErrorDetail]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_to_command_valid() {
        let command = form("T1", "D1", " 3 ").to_command(7).unwrap();
        assert_eq!(command.title, "T1");
        assert_eq!(command.description, "D1");
        assert_eq!(command.assigned_to, 7);
        assert_eq!(command.duration, 3);
    }

    #[test]
    fn test_to_command_rejects_bad_duration() {
        for duration in ["0", "-2", "abc", "1.5", "36501"] {
            let errors = form("T1", "D1", duration).to_command(7).unwrap_err();
            assert_eq!(fields(&errors), vec!["duration"], "duration {:?}", duration);
        }
    }

    #[test]
    fn test_to_command_collects_all_errors() {
        let errors = AssignTaskForm::default().to_command(7).unwrap_err();
        assert_eq!(fields(&errors), vec!["description", "duration", "title"]);
    }

    #[test]
    fn test_to_command_rejects_long_description() {
        let errors = form("T1", &"d".repeat(501), "1").to_command(7).unwrap_err();
        assert_eq!(fields(&errors), vec!["description"]);
    }

    #[test]
    fn test_reassign_form_target() {
        let form = ReassignTaskForm {
            new_user_id: "12".to_string(),
        };
        assert_eq!(form.target().unwrap(), 12);

        let form = ReassignTaskForm::default();
        assert!(form.target().is_err());
    }
}
