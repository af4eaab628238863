//! Diesel row models for task persistence.

use super::schema::{task_history, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Owning project identifier.
    pub project_id: i64,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional assignee identifier.
    pub assignee_id: Option<i64>,
    /// Lifecycle status.
    pub status: String,
    /// Priority.
    pub priority: String,
    /// Progress percentage.
    pub progress: Option<f64>,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Start date.
    pub start_date: Option<DateTime<Utc>>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Estimated effort in hours.
    pub estimated_hours: Option<i32>,
    /// Actual effort in hours.
    pub actual_hours: Option<i32>,
    /// Tag string.
    pub tags: Option<String>,
    /// Manual ordering index.
    pub order_index: i32,
    /// Blocked flag.
    pub is_blocked: bool,
    /// Reason for being blocked.
    pub blocked_reason: Option<String>,
    /// Parent task identifier.
    pub parent_task_id: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Creating user.
    pub created_by: i64,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// User behind the last update.
    pub updated_by: i64,
    /// Soft-deletion timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
    /// User who soft-deleted the task.
    pub deleted_by: Option<i64>,
    /// Row version.
    pub version: i64,
}

/// Insert and update model for task records.
///
/// `None` values are written as `NULL` so that clearing a field persists.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskRecord {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Owning project identifier.
    pub project_id: i64,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional assignee identifier.
    pub assignee_id: Option<i64>,
    /// Lifecycle status.
    pub status: String,
    /// Priority.
    pub priority: String,
    /// Progress percentage.
    pub progress: Option<f64>,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Start date.
    pub start_date: Option<DateTime<Utc>>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Estimated effort in hours.
    pub estimated_hours: Option<i32>,
    /// Actual effort in hours.
    pub actual_hours: Option<i32>,
    /// Tag string.
    pub tags: Option<String>,
    /// Manual ordering index.
    pub order_index: i32,
    /// Blocked flag.
    pub is_blocked: bool,
    /// Reason for being blocked.
    pub blocked_reason: Option<String>,
    /// Parent task identifier.
    pub parent_task_id: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Creating user.
    pub created_by: i64,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// User behind the last update.
    pub updated_by: i64,
    /// Soft-deletion timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
    /// User who soft-deleted the task.
    pub deleted_by: Option<i64>,
    /// Row version.
    pub version: i64,
}

/// Row model for task history records, used for both reads and inserts.
///
/// `seq` is left to the database sequence.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HistoryRow {
    /// History record identifier.
    pub id: uuid::Uuid,
    /// Task the record belongs to.
    pub task_id: uuid::Uuid,
    /// Changed field name.
    pub field_name: String,
    /// Value before the change.
    pub old_value: Option<String>,
    /// Value after the change.
    pub new_value: Option<String>,
    /// User that made the change.
    pub changed_by: i64,
    /// When the change was made.
    pub changed_at: DateTime<Utc>,
}
