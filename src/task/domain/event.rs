//! Facts emitted by task mutations.
//!
//! The domain only produces these values. Delivering them (logging, queueing,
//! notifying) is up to the caller.

use super::{ProjectId, TaskId, TaskStatus, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fact produced by a successful task mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    /// A task was created.
    Created {
        /// Created task.
        task_id: TaskId,
        /// Owning project.
        project_id: ProjectId,
        /// Creating user.
        actor: UserId,
        /// When the task was created.
        occurred_at: DateTime<Utc>,
    },
    /// The task moved between statuses.
    StatusChanged {
        /// Affected task.
        task_id: TaskId,
        /// Previous status.
        from: TaskStatus,
        /// New status.
        to: TaskStatus,
        /// Acting user.
        actor: UserId,
        /// When the change happened.
        occurred_at: DateTime<Utc>,
    },
    /// The assignee changed.
    Assigned {
        /// Affected task.
        task_id: TaskId,
        /// Previous assignee.
        from: Option<UserId>,
        /// New assignee, `None` when unassigned.
        to: Option<UserId>,
        /// Acting user.
        actor: UserId,
        /// When the change happened.
        occurred_at: DateTime<Utc>,
    },
    /// The task entered `Done`.
    Completed {
        /// Affected task.
        task_id: TaskId,
        /// Acting user.
        actor: UserId,
        /// `true` when completion skipped the transition table because
        /// progress reached 100.
        forced: bool,
        /// When the task was completed.
        occurred_at: DateTime<Utc>,
    },
    /// The task was soft-deleted.
    Deleted {
        /// Affected task.
        task_id: TaskId,
        /// Acting user.
        actor: UserId,
        /// When the task was deleted.
        occurred_at: DateTime<Utc>,
    },
    /// A soft-deleted task was restored.
    Restored {
        /// Affected task.
        task_id: TaskId,
        /// Acting user.
        actor: UserId,
        /// When the task was restored.
        occurred_at: DateTime<Utc>,
    },
}

impl TaskEvent {
    /// Returns the affected task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        match self {
            Self::Created { task_id, .. }
            | Self::StatusChanged { task_id, .. }
            | Self::Assigned { task_id, .. }
            | Self::Completed { task_id, .. }
            | Self::Deleted { task_id, .. }
            | Self::Restored { task_id, .. } => *task_id,
        }
    }

    /// Returns the user that caused the event.
    #[must_use]
    pub const fn actor(&self) -> UserId {
        match self {
            Self::Created { actor, .. }
            | Self::StatusChanged { actor, .. }
            | Self::Assigned { actor, .. }
            | Self::Completed { actor, .. }
            | Self::Deleted { actor, .. }
            | Self::Restored { actor, .. } => *actor,
        }
    }

    /// Returns when the event happened.
    #[must_use]
    pub const fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::Created { occurred_at, .. }
            | Self::StatusChanged { occurred_at, .. }
            | Self::Assigned { occurred_at, .. }
            | Self::Completed { occurred_at, .. }
            | Self::Deleted { occurred_at, .. }
            | Self::Restored { occurred_at, .. } => *occurred_at,
        }
    }

    /// Returns the event type name used in serialized payloads.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::StatusChanged { .. } => "status_changed",
            Self::Assigned { .. } => "assigned",
            Self::Completed { .. } => "completed",
            Self::Deleted { .. } => "deleted",
            Self::Restored { .. } => "restored",
        }
    }
}
