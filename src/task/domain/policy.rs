//! Configurable task lifecycle policy.

use serde::{Deserialize, Serialize};

/// How reaching 100% progress moves a task to `Done`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressCompletion {
    /// Completion is a forced transition exempt from the transition table,
    /// so even a cancelled or archived task becomes `Done`.
    #[default]
    Forced,
    /// Completion follows the transition table and fails like a direct
    /// status change would.
    Guarded,
}

/// Lifecycle policy applied by the task service.
///
/// # Examples
///
/// ```
/// use tasklane::task::domain::{ProgressCompletion, TaskPolicy};
///
/// let policy = TaskPolicy::default();
/// assert_eq!(policy.progress_completion, ProgressCompletion::Forced);
/// assert!(!policy.cascade_soft_delete);
///
/// let strict = TaskPolicy::strict();
/// assert_eq!(strict.progress_completion, ProgressCompletion::Guarded);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskPolicy {
    /// Transition rule used when progress reaches 100.
    pub progress_completion: ProgressCompletion,
    /// Whether soft-deleting a task also soft-deletes its subtasks.
    pub cascade_soft_delete: bool,
}

impl TaskPolicy {
    /// Policy where every status change, including auto-completion, obeys
    /// the transition table.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            progress_completion: ProgressCompletion::Guarded,
            cascade_soft_delete: false,
        }
    }

    /// Returns a copy with subtask cascading on soft delete switched on or
    /// off.
    #[must_use]
    pub const fn with_cascade_soft_delete(mut self, cascade: bool) -> Self {
        self.cascade_soft_delete = cascade;
        self
    }
}
