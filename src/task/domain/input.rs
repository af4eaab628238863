//! Inputs accepted by task creation, batch updates and re-parenting.

use super::{
    Hours, Progress, ProjectId, Tags, Task, TaskDescription, TaskDomainError, TaskField, TaskId,
    TaskPriority, TaskStatus, TaskTitle, UserId,
};
use chrono::{DateTime, Utc};

/// Unvalidated values for a new task.
///
/// Validation happens in [`Task::create`] so that every rule is applied in
/// one place.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub(super) title: String,
    pub(super) project_id: ProjectId,
    pub(super) description: Option<String>,
    pub(super) priority: Option<TaskPriority>,
    pub(super) assignee: Option<UserId>,
    pub(super) due_date: Option<DateTime<Utc>>,
    pub(super) start_date: Option<DateTime<Utc>>,
    pub(super) estimated_hours: Option<i64>,
    pub(super) tags: Option<String>,
    pub(super) order_index: Option<i32>,
    pub(super) parent: Option<ParentLink>,
}

impl NewTask {
    /// Creates a draft with the required title and owning project.
    #[must_use]
    pub fn new(title: impl Into<String>, project_id: ProjectId) -> Self {
        Self {
            title: title.into(),
            project_id,
            description: None,
            priority: None,
            assignee: None,
            due_date: None,
            start_date: None,
            estimated_hours: None,
            tags: None,
            order_index: None,
            parent: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority. Defaults to [`TaskPriority::Medium`].
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the initial assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the start date.
    #[must_use]
    pub const fn with_start_date(mut self, start_date: DateTime<Utc>) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Sets the estimated effort in hours.
    #[must_use]
    pub const fn with_estimated_hours(mut self, hours: i64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    /// Sets the tag string.
    #[must_use]
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Sets the manual ordering index. Defaults to `0`.
    #[must_use]
    pub const fn with_order_index(mut self, order_index: i32) -> Self {
        self.order_index = Some(order_index);
        self
    }

    /// Makes the new task a subtask of `parent`.
    #[must_use]
    pub fn with_parent(mut self, parent: ParentLink) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the requested parent, if any.
    #[must_use]
    pub const fn parent(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }
}

/// A prospective parent task together with its own ancestry.
///
/// `ancestors` lists the parent's parent, grandparent and so on. The
/// lineage is what lets the aggregate reject cycles without loading tasks
/// itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLink {
    id: TaskId,
    project_id: ProjectId,
    ancestors: Vec<TaskId>,
}

impl ParentLink {
    /// Builds a link to `parent` with the given ancestor chain.
    #[must_use]
    pub fn new(parent: &Task, ancestors: impl IntoIterator<Item = TaskId>) -> Self {
        Self {
            id: parent.id(),
            project_id: parent.project_id(),
            ancestors: ancestors.into_iter().collect(),
        }
    }

    /// Returns the parent task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the parent's project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the parent's ancestors, nearest first.
    #[must_use]
    pub fn ancestors(&self) -> &[TaskId] {
        &self.ancestors
    }

    pub(super) fn validate_for(
        &self,
        child: TaskId,
        child_project: ProjectId,
    ) -> Result<(), TaskDomainError> {
        if self.id == child {
            return Err(TaskDomainError::validation(
                TaskField::ParentTask,
                "a task cannot be its own parent",
            ));
        }
        if self.ancestors.contains(&child) {
            return Err(TaskDomainError::validation(
                TaskField::ParentTask,
                format!("task {child} is an ancestor of {}", self.id),
            ));
        }
        if self.project_id != child_project {
            return Err(TaskDomainError::validation(
                TaskField::ParentTask,
                format!(
                    "parent belongs to project {}, task belongs to project {child_project}",
                    self.project_id
                ),
            ));
        }
        Ok(())
    }
}

/// A batch of field changes applied in one mutation.
///
/// Outer `None` leaves a field untouched. For nullable fields the inner
/// `None` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    title: Option<String>,
    description: Option<Option<String>>,
    assignee: Option<Option<UserId>>,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    progress: Option<f64>,
    due_date: Option<Option<DateTime<Utc>>>,
    start_date: Option<Option<DateTime<Utc>>>,
    estimated_hours: Option<Option<i64>>,
    actual_hours: Option<Option<i64>>,
    tags: Option<Option<String>>,
    order_index: Option<i32>,
}

impl TaskUpdate {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces or clears the description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Replaces or clears the assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: Option<UserId>) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Requests a status change, validated against the transition table.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Replaces the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Replaces the progress percentage.
    #[must_use]
    pub const fn with_progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Replaces or clears the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Replaces or clears the start date.
    #[must_use]
    pub const fn with_start_date(mut self, start_date: Option<DateTime<Utc>>) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Replaces or clears the estimated hours.
    #[must_use]
    pub const fn with_estimated_hours(mut self, hours: Option<i64>) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    /// Replaces or clears the actual hours.
    #[must_use]
    pub const fn with_actual_hours(mut self, hours: Option<i64>) -> Self {
        self.actual_hours = Some(hours);
        self
    }

    /// Replaces or clears the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: Option<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Replaces the manual ordering index.
    #[must_use]
    pub const fn with_order_index(mut self, order_index: i32) -> Self {
        self.order_index = Some(order_index);
        self
    }

    /// Returns `true` when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub(super) fn validate(self) -> Result<ValidatedUpdate, TaskDomainError> {
        Ok(ValidatedUpdate {
            title: self.title.map(TaskTitle::new).transpose()?,
            description: self
                .description
                .map(|value| parse_optional(value, TaskDescription::parse))
                .transpose()?,
            assignee: self.assignee,
            status: self.status,
            priority: self.priority,
            progress: self.progress.map(Progress::new).transpose()?,
            due_date: self.due_date,
            start_date: self.start_date,
            estimated_hours: self
                .estimated_hours
                .map(|value| hours_for(TaskField::EstimatedHours, value))
                .transpose()?,
            actual_hours: self
                .actual_hours
                .map(|value| hours_for(TaskField::ActualHours, value))
                .transpose()?,
            tags: self
                .tags
                .map(|value| parse_optional(value, Tags::parse))
                .transpose()?,
            order_index: self.order_index,
        })
    }
}

/// A [`TaskUpdate`] whose scalar values passed validation.
///
/// Rules that depend on the clock or on the task's current state are checked
/// while applying.
#[derive(Debug, Clone)]
pub(super) struct ValidatedUpdate {
    pub(super) title: Option<TaskTitle>,
    pub(super) description: Option<Option<TaskDescription>>,
    pub(super) assignee: Option<Option<UserId>>,
    pub(super) status: Option<TaskStatus>,
    pub(super) priority: Option<TaskPriority>,
    pub(super) progress: Option<Progress>,
    pub(super) due_date: Option<Option<DateTime<Utc>>>,
    pub(super) start_date: Option<Option<DateTime<Utc>>>,
    pub(super) estimated_hours: Option<Option<Hours>>,
    pub(super) actual_hours: Option<Option<Hours>>,
    pub(super) tags: Option<Option<Tags>>,
    pub(super) order_index: Option<i32>,
}

/// Parses an optional raw value with a parser that maps blank input to `None`.
fn parse_optional<T>(
    value: Option<String>,
    parse: impl FnOnce(String) -> Result<Option<T>, TaskDomainError>,
) -> Result<Option<T>, TaskDomainError> {
    Ok(value.map(parse).transpose()?.flatten())
}

fn hours_for(field: TaskField, value: Option<i64>) -> Result<Option<Hours>, TaskDomainError> {
    value.map(|hours| Hours::new(field, hours)).transpose()
}
