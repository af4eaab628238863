//! Append-only audit history and the field diff that produces it.

use super::{HistoryId, Task, TaskEvent, TaskField, TaskId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observed change of one task field.
///
/// History records are immutable once created and are never updated or
/// deleted by the task core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHistory {
    id: HistoryId,
    task_id: TaskId,
    field: TaskField,
    old_value: Option<String>,
    new_value: Option<String>,
    actor: UserId,
    changed_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted history record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedHistoryData {
    /// Persisted record identifier.
    pub id: HistoryId,
    /// Task the record belongs to.
    pub task_id: TaskId,
    /// Changed field.
    pub field: TaskField,
    /// Value before the change.
    pub old_value: Option<String>,
    /// Value after the change.
    pub new_value: Option<String>,
    /// User that made the change.
    pub actor: UserId,
    /// When the change was made.
    pub changed_at: DateTime<Utc>,
}

impl TaskHistory {
    /// Creates a new history record.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        field: TaskField,
        old_value: Option<String>,
        new_value: Option<String>,
        actor: UserId,
        changed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: HistoryId::new(),
            task_id,
            field,
            old_value,
            new_value,
            actor,
            changed_at,
        }
    }

    /// Reconstructs a history record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedHistoryData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            field: data.field,
            old_value: data.old_value,
            new_value: data.new_value,
            actor: data.actor,
            changed_at: data.changed_at,
        }
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> HistoryId {
        self.id
    }

    /// Returns the task the record belongs to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the changed field.
    #[must_use]
    pub const fn field(&self) -> TaskField {
        self.field
    }

    /// Returns the value before the change.
    #[must_use]
    pub fn old_value(&self) -> Option<&str> {
        self.old_value.as_deref()
    }

    /// Returns the value after the change.
    #[must_use]
    pub fn new_value(&self) -> Option<&str> {
        self.new_value.as_deref()
    }

    /// Returns the user that made the change.
    #[must_use]
    pub const fn actor(&self) -> UserId {
        self.actor
    }

    /// Returns when the change was made.
    #[must_use]
    pub const fn changed_at(&self) -> DateTime<Utc> {
        self.changed_at
    }
}

/// Computes one history record per field in `fields` whose value differs
/// between `old` and `new`.
///
/// Values are compared in their recorded string form, so `None -> Some` and
/// `Some -> None` count as changes. Records follow the order of `fields`.
#[must_use]
pub fn diff(
    old: &Task,
    new: &Task,
    actor: UserId,
    fields: &[TaskField],
    changed_at: DateTime<Utc>,
) -> Vec<TaskHistory> {
    fields
        .iter()
        .filter_map(|field| {
            let before = old.field_value(*field);
            let after = new.field_value(*field);
            (before != after)
                .then(|| TaskHistory::new(new.id(), *field, before, after, actor, changed_at))
        })
        .collect()
}

/// Output of a task mutation: the history to persist alongside the task and
/// the facts to hand to whoever delivers notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChange {
    /// History records, one per changed field.
    pub history: Vec<TaskHistory>,
    /// Emitted facts.
    pub events: Vec<TaskEvent>,
}

impl TaskChange {
    /// Returns a change carrying only events.
    #[must_use]
    pub const fn events_only(events: Vec<TaskEvent>) -> Self {
        Self {
            history: Vec::new(),
            events,
        }
    }

    /// Returns `true` when nothing observable changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty() && self.events.is_empty()
    }

    /// Returns the fields recorded in this change.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<TaskField> {
        self.history.iter().map(TaskHistory::field).collect()
    }

    /// Appends another change, keeping record order.
    pub fn extend(&mut self, other: Self) {
        self.history.extend(other.history);
        self.events.extend(other.events);
    }
}
