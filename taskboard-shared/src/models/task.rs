//! Task model and task store operations
//!
//! A task is assigned to exactly one user, carries a due date derived from
//! its duration at creation, and can be completed once.
//!
//! # State Machine
//!
//! ```text
//! open --complete--> completed
//! open --reassign--> open
//! open/completed --delete--> (row removed)
//! ```
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE task (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     title TEXT NOT NULL,
//!     description TEXT NOT NULL,
//!     assigned_to INTEGER NOT NULL REFERENCES user(id),
//!     created_at TEXT NOT NULL,
//!     duration INTEGER NOT NULL,
//!     due_date TEXT NOT NULL,
//!     completed BOOLEAN NOT NULL DEFAULT 0,
//!     completion_date TEXT
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use taskboard_shared::models::task::{CreateTask, Task};
//! use sqlx::SqlitePool;
//!
//! # async fn example(pool: SqlitePool, alice_id: i64) -> Result<(), Box<dyn std::error::Error>> {
//! let task = Task::create(&pool, CreateTask {
//!     title: "T1".to_string(),
//!     description: "D1".to_string(),
//!     assigned_to: alice_id,
//!     duration: 3,
//! }).await?;
//!
//! let done = Task::mark_complete(&pool, task.id).await?;
//! assert!(done.completed);
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{user::User, TaskId, UserId};
use crate::error::StoreError;

/// Longest accepted duration, in days
pub const MAX_DURATION_DAYS: i64 = 36_500;

/// Lifecycle state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Assigned and not yet completed
    Open,

    /// Completed by its assignee
    Completed,
}

impl TaskState {
    /// Converts state to a display string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Open => "open",
            TaskState::Completed => "completed",
        }
    }

    /// Checks if no transition leads out of this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Completed)
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: TaskId,

    /// Short title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// User the task is assigned to
    pub assigned_to: UserId,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// Allotted time in days
    pub duration: i64,

    /// `created_at + duration` days, fixed at creation
    pub due_date: DateTime<Utc>,

    /// Whether the assignee completed the task
    pub completed: bool,

    /// When the task was completed (present iff `completed`)
    pub completion_date: Option<DateTime<Utc>>,
}

impl Task {
    /// Current lifecycle state
    pub fn state(&self) -> TaskState {
        if self.completed {
            TaskState::Completed
        } else {
            TaskState::Open
        }
    }

    /// Open and past its due date at `now`
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && now > self.due_date
    }
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Task title
    pub title: String,

    /// Task description
    pub description: String,

    /// Assignee
    pub assigned_to: UserId,

    /// Duration in days, must be positive
    pub duration: i64,
}

/// Checks that a duration is a positive number of days within range
pub fn validate_duration(duration: i64) -> Result<(), StoreError> {
    if duration <= 0 {
        return Err(StoreError::InvalidInput(
            "Duration must be a positive number of days".to_string(),
        ));
    }

    if duration > MAX_DURATION_DAYS {
        return Err(StoreError::InvalidInput(format!(
            "Duration must be at most {} days",
            MAX_DURATION_DAYS
        )));
    }

    Ok(())
}

/// Computes the due date of a task created at `created_at`
pub fn compute_due_date(
    created_at: DateTime<Utc>,
    duration: i64,
) -> Result<DateTime<Utc>, StoreError> {
    validate_duration(duration)?;

    created_at
        .checked_add_signed(Duration::days(duration))
        .ok_or_else(|| StoreError::InvalidInput("Due date is out of range".to_string()))
}

/// Loads a user that may receive tasks: it must exist and must not be an admin
pub async fn require_assignable(pool: &SqlitePool, user_id: UserId) -> Result<User, StoreError> {
    let user = User::find_by_id(pool, user_id).await?.ok_or_else(|| {
        StoreError::InvalidInput(format!("Assignee {} does not exist", user_id))
    })?;

    if user.is_admin {
        return Err(StoreError::InvalidInput(
            "Tasks cannot be assigned to an administrator".to_string(),
        ));
    }

    Ok(user)
}

impl Task {
    /// Creates a new open task
    ///
    /// `created_at` is the current time and `due_date` is derived from it.
    ///
    /// # Errors
    ///
    /// - `StoreError::InvalidInput` for a non-positive or oversized duration,
    ///   or an assignee that does not exist or is an admin
    pub async fn create(pool: &SqlitePool, data: CreateTask) -> Result<Self, StoreError> {
        let created_at = Utc::now();
        let due_date = compute_due_date(created_at, data.duration)?;

        require_assignable(pool, data.assigned_to).await?;

        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO task (title, description, assigned_to, created_at, duration, due_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id, title, description, assigned_to, created_at, duration,
                      due_date, completed, completion_date
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.assigned_to)
        .bind(created_at)
        .bind(data.duration)
        .bind(due_date)
        .fetch_one(pool)
        .await?;

        info!(task_id = task.id, assigned_to = task.assigned_to, "Created task");
        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &SqlitePool, id: TaskId) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, assigned_to, created_at, duration,
                   due_date, completed, completion_date
            FROM task
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Gets a task by ID, failing with `NotFound` if absent
    pub async fn get(pool: &SqlitePool, id: TaskId) -> Result<Self, StoreError> {
        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| StoreError::task_not_found(id))
    }

    /// Lists every task in insertion order
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, assigned_to, created_at, duration,
                   due_date, completed, completion_date
            FROM task
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Lists the tasks assigned to one user in insertion order
    pub async fn list_for_user(pool: &SqlitePool, user_id: UserId) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, assigned_to, created_at, duration,
                   due_date, completed, completion_date
            FROM task
            WHERE assigned_to = ?1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Marks a task completed now
    ///
    /// Completion is terminal: completing an already completed task returns
    /// it with its original `completion_date`. Ownership is the caller's
    /// responsibility.
    pub async fn mark_complete(pool: &SqlitePool, id: TaskId) -> Result<Self, StoreError> {
        let current = Self::get(pool, id).await?;
        if current.state().is_terminal() {
            debug!(task_id = id, "Task already completed");
            return Ok(current);
        }

        // The guard covers a completion that lands between the read and the update
        let completed = sqlx::query_as::<_, Task>(
            r#"
            UPDATE task
            SET completed = 1,
                completion_date = ?2
            WHERE id = ?1 AND completed = 0
            RETURNING id, title, description, assigned_to, created_at, duration,
                      due_date, completed, completion_date
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await?;

        match completed {
            Some(task) => {
                info!(task_id = task.id, assigned_to = task.assigned_to, "Completed task");
                Ok(task)
            }
            None => Self::get(pool, id).await,
        }
    }

    /// Moves a task to another user
    ///
    /// The target must exist and must not be an admin. `due_date` is left
    /// untouched.
    pub async fn reassign(
        pool: &SqlitePool,
        id: TaskId,
        new_user_id: UserId,
    ) -> Result<Self, StoreError> {
        require_assignable(pool, new_user_id).await?;

        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE task
            SET assigned_to = ?2
            WHERE id = ?1
            RETURNING id, title, description, assigned_to, created_at, duration,
                      due_date, completed, completion_date
            "#,
        )
        .bind(id)
        .bind(new_user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::task_not_found(id))?;

        info!(task_id = task.id, assigned_to = task.assigned_to, "Reassigned task");
        Ok(task)
    }

    /// Deletes a task, whatever its state
    pub async fn delete(pool: &SqlitePool, id: TaskId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM task WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::task_not_found(id));
        }

        info!(task_id = id, "Deleted task");
        Ok(())
    }

    /// Counts total number of tasks
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM task")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_task(completed: bool) -> Task {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        Task {
            id: 1,
            title: "T1".to_string(),
            description: "D1".to_string(),
            assigned_to: 2,
            created_at,
            duration: 3,
            due_date: created_at + Duration::days(3),
            completed,
            completion_date: completed.then(|| created_at + Duration::days(1)),
        }
    }

    #[test]
    fn test_task_state_as_str() {
        assert_eq!(TaskState::Open.as_str(), "open");
        assert_eq!(TaskState::Completed.as_str(), "completed");
    }

    #[test]
    fn test_only_completed_is_terminal() {
        assert!(TaskState::Completed.is_terminal());
        assert!(!TaskState::Open.is_terminal());
    }

    #[test]
    fn test_compute_due_date_adds_whole_days() {
        let created_at = Utc.with_ymd_and_hms(2024, 2, 27, 8, 30, 0).unwrap();

        let due = compute_due_date(created_at, 3).unwrap();

        // Crosses the leap day
        assert_eq!(due, Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap());
        assert_eq!(due - created_at, Duration::days(3));
    }

    #[test]
    fn test_validate_duration_bounds() {
        assert!(validate_duration(1).is_ok());
        assert!(validate_duration(MAX_DURATION_DAYS).is_ok());
        assert!(matches!(validate_duration(0), Err(StoreError::InvalidInput(_))));
        assert!(matches!(validate_duration(-5), Err(StoreError::InvalidInput(_))));
        assert!(matches!(
            validate_duration(MAX_DURATION_DAYS + 1),
            Err(StoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_state_follows_completed_flag() {
        assert_eq!(sample_task(false).state(), TaskState::Open);
        assert_eq!(sample_task(true).state(), TaskState::Completed);
    }

    #[test]
    fn test_is_overdue() {
        let open = sample_task(false);
        let done = sample_task(true);
        let late = open.due_date + Duration::hours(1);

        assert!(!open.is_overdue(open.created_at));
        assert!(open.is_overdue(late));
        assert!(!done.is_overdue(late));
    }
}
