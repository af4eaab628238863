//! Repository port for task persistence, lookup and audit history.

use crate::task::domain::{ProjectId, Task, TaskHistory, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// A mutated task paired with the history it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskWrite {
    /// Task at the version it was loaded with.
    pub task: Task,
    /// History records to append.
    pub history: Vec<TaskHistory>,
}

impl TaskWrite {
    /// Pairs `task` with `history`.
    #[must_use]
    pub const fn new(task: Task, history: Vec<TaskHistory>) -> Self {
        Self { task, history }
    }
}

/// Task persistence contract.
///
/// Writes are atomic: a task and the history records produced by the same
/// mutation are stored together or not at all. Updates use optimistic
/// concurrency on [`Task::version`].
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task together with any history produced while creating
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &Task, history: &[TaskHistory]) -> TaskRepositoryResult<Task>;

    /// Persists a mutated task and appends its history records.
    ///
    /// The stored row must still be at `task.version()`. On success the
    /// returned task carries the next version.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// and [`TaskRepositoryError::Conflict`] when another writer updated it
    /// since it was loaded.
    async fn update(&self, task: &Task, history: &[TaskHistory]) -> TaskRepositoryResult<Task>;

    /// Persists several mutated tasks as one unit.
    ///
    /// Every task is checked as in [`Self::update`]; when any check fails
    /// nothing is written. Stored tasks are returned in input order.
    ///
    /// # Errors
    ///
    /// Returns the first [`TaskRepositoryError::NotFound`] or
    /// [`TaskRepositoryError::Conflict`] met in input order.
    async fn update_all(&self, batch: &[TaskWrite]) -> TaskRepositoryResult<Vec<Task>>;

    /// Finds a live task by identifier.
    ///
    /// Returns `None` when the task does not exist or is soft-deleted.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Finds a task by identifier even when it is soft-deleted.
    ///
    /// Reserved for restore and administrative paths.
    async fn find_including_deleted(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns the live tasks of a project ordered by `order_index`, then by
    /// creation time.
    async fn list_by_project(&self, project_id: ProjectId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the live direct subtasks of `parent_id`.
    async fn list_children(&self, parent_id: TaskId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the history of a task, oldest first.
    async fn history_for(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<TaskHistory>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The task changed since it was loaded.
    #[error("task {task_id} was modified concurrently: expected version {expected}, found {actual}")]
    Conflict {
        /// Task identifier.
        task_id: TaskId,
        /// Version the caller loaded.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
