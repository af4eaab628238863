//! Error types for task domain validation and parsing.

use super::{TaskField, TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while validating or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// A field value violates its invariant.
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Field that failed validation.
        field: TaskField,
        /// Human-readable reason.
        reason: String,
    },

    /// The requested status change is not permitted.
    #[error("invalid status transition for task {task_id}: {from} -> {to}")]
    InvalidStateTransition {
        /// Task identifier.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested target status.
        to: TaskStatus,
    },

    /// The task is soft-deleted and cannot be mutated.
    #[error("task {0} is deleted")]
    TaskDeleted(TaskId),

    /// A restore was requested for a task that is not deleted.
    #[error("task {0} is not deleted")]
    TaskNotDeleted(TaskId),
}

impl TaskDomainError {
    /// Builds a validation error for `field`.
    pub fn validation(field: TaskField, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Returns the offending field for validation errors.
    #[must_use]
    pub const fn field(&self) -> Option<TaskField> {
        match self {
            Self::Validation { field, .. } => Some(*field),
            Self::InvalidStateTransition { .. } => Some(TaskField::Status),
            Self::TaskDeleted(_) | Self::TaskNotDeleted(_) => None,
        }
    }
}

/// Error returned while parsing task statuses from persistence or requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);

/// Error returned while parsing tracked field names.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task field: {0}")]
pub struct ParseTaskFieldError(pub String);
