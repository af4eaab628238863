//! Task aggregate root and its mutation operations.
//!
//! Every mutation validates its input before touching state, works on a copy
//! of the task and commits the copy only when it succeeds, so a failing call
//! leaves the task exactly as it was. Committed mutations are diffed against
//! the previous state to produce one history record per changed field.

use super::{
    AuditStamp, BlockReason, Hours, NewTask, ParentLink, Progress, ProgressCompletion, ProjectId,
    Tags, TaskChange, TaskDescription, TaskDomainError, TaskEvent, TaskField, TaskId,
    TaskPriority, TaskStatus, TaskTitle, TaskUpdate, UserId, ValidatedUpdate, diff,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// History value recorded for a task without an assignee.
pub const UNASSIGNED: &str = "Unassigned";

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    project_id: ProjectId,
    title: TaskTitle,
    description: Option<TaskDescription>,
    assignee: Option<UserId>,
    status: TaskStatus,
    priority: TaskPriority,
    progress: Option<Progress>,
    due_date: Option<DateTime<Utc>>,
    start_date: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    estimated_hours: Option<Hours>,
    actual_hours: Option<Hours>,
    tags: Option<Tags>,
    order_index: i32,
    blocked_reason: Option<BlockReason>,
    parent_id: Option<TaskId>,
    audit: AuditStamp,
    version: u64,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Title.
    pub title: TaskTitle,
    /// Description, if any.
    pub description: Option<TaskDescription>,
    /// Assignee, if any.
    pub assignee: Option<UserId>,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Priority.
    pub priority: TaskPriority,
    /// Progress percentage, if reported.
    pub progress: Option<Progress>,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Start date.
    pub start_date: Option<DateTime<Utc>>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Estimated effort.
    pub estimated_hours: Option<Hours>,
    /// Actual effort.
    pub actual_hours: Option<Hours>,
    /// Tags.
    pub tags: Option<Tags>,
    /// Manual ordering index.
    pub order_index: i32,
    /// Block reason; a task is blocked exactly when this is set.
    pub blocked_reason: Option<BlockReason>,
    /// Parent task, if this is a subtask.
    pub parent_id: Option<TaskId>,
    /// Audit stamp.
    pub audit: AuditStamp,
    /// Row version used for optimistic concurrency.
    pub version: u64,
}

impl Task {
    /// Creates a new task in [`TaskStatus::Todo`] owned by `creator`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Validation`] naming the offending field when
    /// the title, description, estimated hours, tags, due date or parent link
    /// is invalid.
    pub fn create(
        draft: NewTask,
        creator: UserId,
        clock: &impl Clock,
    ) -> Result<(Self, TaskChange), TaskDomainError> {
        let timestamp = clock.utc();
        let id = TaskId::new();
        let title = TaskTitle::new(&draft.title)?;
        let description = draft
            .description
            .map(TaskDescription::parse)
            .transpose()?
            .flatten();
        let estimated_hours = draft
            .estimated_hours
            .map(|hours| Hours::new(TaskField::EstimatedHours, hours))
            .transpose()?;
        let tags = draft.tags.map(Tags::parse).transpose()?.flatten();
        if let Some(due_date) = draft.due_date {
            ensure_not_past(due_date, timestamp)?;
        }
        if let Some(parent) = &draft.parent {
            parent.validate_for(id, draft.project_id)?;
        }

        let task = Self {
            id,
            project_id: draft.project_id,
            title,
            description,
            assignee: draft.assignee,
            status: TaskStatus::Todo,
            priority: draft.priority.unwrap_or_default(),
            progress: None,
            due_date: draft.due_date,
            start_date: draft.start_date,
            completed_at: None,
            estimated_hours,
            actual_hours: None,
            tags,
            order_index: draft.order_index.unwrap_or_default(),
            blocked_reason: None,
            parent_id: draft.parent.as_ref().map(ParentLink::id),
            audit: AuditStamp::created(creator, timestamp),
            version: 0,
        };
        let created = TaskEvent::Created {
            task_id: id,
            project_id: task.project_id,
            actor: creator,
            occurred_at: timestamp,
        };
        Ok((task, TaskChange::events_only(vec![created])))
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            title: data.title,
            description: data.description,
            assignee: data.assignee,
            status: data.status,
            priority: data.priority,
            progress: data.progress,
            due_date: data.due_date,
            start_date: data.start_date,
            completed_at: data.completed_at,
            estimated_hours: data.estimated_hours,
            actual_hours: data.actual_hours,
            tags: data.tags,
            order_index: data.order_index,
            blocked_reason: data.blocked_reason,
            parent_id: data.parent_id,
            audit: data.audit,
            version: data.version,
        }
    }

    /// Returns the persisted representation of this task.
    #[must_use]
    pub fn to_persisted(&self) -> PersistedTaskData {
        PersistedTaskData {
            id: self.id,
            project_id: self.project_id,
            title: self.title.clone(),
            description: self.description.clone(),
            assignee: self.assignee,
            status: self.status,
            priority: self.priority,
            progress: self.progress,
            due_date: self.due_date,
            start_date: self.start_date,
            completed_at: self.completed_at,
            estimated_hours: self.estimated_hours,
            actual_hours: self.actual_hours,
            tags: self.tags.clone(),
            order_index: self.order_index,
            blocked_reason: self.blocked_reason.clone(),
            parent_id: self.parent_id,
            audit: self.audit.clone(),
            version: self.version,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub const fn description(&self) -> Option<&TaskDescription> {
        self.description.as_ref()
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assignee(&self) -> Option<UserId> {
        self.assignee
    }

    /// Returns the creating user.
    #[must_use]
    pub const fn creator(&self) -> UserId {
        self.audit.created_by
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the reported progress, if any.
    #[must_use]
    pub const fn progress(&self) -> Option<Progress> {
        self.progress
    }

    /// Returns the due date.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the start date.
    #[must_use]
    pub const fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    /// Returns when the task entered `Done`, while it stays there.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the estimated effort.
    #[must_use]
    pub const fn estimated_hours(&self) -> Option<Hours> {
        self.estimated_hours
    }

    /// Returns the actual effort.
    #[must_use]
    pub const fn actual_hours(&self) -> Option<Hours> {
        self.actual_hours
    }

    /// Returns the tags.
    #[must_use]
    pub const fn tags(&self) -> Option<&Tags> {
        self.tags.as_ref()
    }

    /// Returns the manual ordering index.
    #[must_use]
    pub const fn order_index(&self) -> i32 {
        self.order_index
    }

    /// Returns `true` while the task is blocked.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        self.blocked_reason.is_some()
    }

    /// Returns the block reason while the task is blocked.
    #[must_use]
    pub const fn blocked_reason(&self) -> Option<&BlockReason> {
        self.blocked_reason.as_ref()
    }

    /// Returns the parent task, if this is a subtask.
    #[must_use]
    pub const fn parent_id(&self) -> Option<TaskId> {
        self.parent_id
    }

    /// Returns the audit stamp.
    #[must_use]
    pub const fn audit(&self) -> &AuditStamp {
        &self.audit
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.audit.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.audit.updated_at
    }

    /// Returns `true` when the task is soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.audit.is_deleted()
    }

    /// Returns the row version the task was loaded at.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns the value of `field` as recorded in history entries.
    ///
    /// An unassigned task reports [`UNASSIGNED`] rather than `None`.
    #[must_use]
    pub fn field_value(&self, field: TaskField) -> Option<String> {
        match field {
            TaskField::Title => Some(self.title.to_string()),
            TaskField::Description => self.description.as_ref().map(ToString::to_string),
            TaskField::Assignee => Some(
                self.assignee
                    .map_or_else(|| UNASSIGNED.to_owned(), |user| user.to_string()),
            ),
            TaskField::Status => Some(self.status.label().to_owned()),
            TaskField::Priority => Some(self.priority.label().to_owned()),
            TaskField::Progress => self.progress.map(|progress| progress.to_string()),
            TaskField::DueDate => self.due_date.map(|date| date.to_rfc3339()),
            TaskField::StartDate => self.start_date.map(|date| date.to_rfc3339()),
            TaskField::EstimatedHours => self.estimated_hours.map(|hours| hours.to_string()),
            TaskField::ActualHours => self.actual_hours.map(|hours| hours.to_string()),
            TaskField::Tags => self.tags.as_ref().map(ToString::to_string),
            TaskField::OrderIndex => Some(self.order_index.to_string()),
            TaskField::IsBlocked => Some(self.is_blocked().to_string()),
            TaskField::BlockedReason => self.blocked_reason.as_ref().map(ToString::to_string),
            TaskField::ParentTask => self.parent_id.map(|parent| parent.to_string()),
        }
    }

    /// Replaces the title.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Validation`] for [`TaskField::Title`] when
    /// the title is empty or too long, or [`TaskDomainError::TaskDeleted`].
    pub fn rename(
        &mut self,
        title: &str,
        actor: UserId,
        clock: &impl Clock,
    ) -> Result<TaskChange, TaskDomainError> {
        let validated = TaskTitle::new(title)?;
        self.apply(actor, clock, |next, _| {
            next.title = validated;
            Ok(Vec::new())
        })
    }

    /// Replaces or clears the description.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Validation`] for
    /// [`TaskField::Description`] when the text is too long, or
    /// [`TaskDomainError::TaskDeleted`].
    pub fn update_description(
        &mut self,
        description: Option<&str>,
        actor: UserId,
        clock: &impl Clock,
    ) -> Result<TaskChange, TaskDomainError> {
        let validated = description
            .map(TaskDescription::parse)
            .transpose()?
            .flatten();
        self.apply(actor, clock, |next, _| {
            next.description = validated;
            Ok(Vec::new())
        })
    }

    /// Moves the task to `status` if the transition table allows it.
    ///
    /// Entering `Done` stamps `completed_at` and forces progress to 100.
    /// Leaving `Done` clears `completed_at`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] when the
    /// transition is not permitted, or [`TaskDomainError::TaskDeleted`].
    pub fn change_status(
        &mut self,
        status: TaskStatus,
        actor: UserId,
        clock: &impl Clock,
    ) -> Result<TaskChange, TaskDomainError> {
        self.apply(actor, clock, |next, now| {
            next.transition(status, actor, now, false)
        })
    }

    /// Records progress; reaching 100 completes the task.
    ///
    /// `completion` decides whether auto-completion may skip the transition
    /// table.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Validation`] for [`TaskField::Progress`]
    /// when the value is outside `0..=100`,
    /// [`TaskDomainError::InvalidStateTransition`] when guarded completion is
    /// not permitted, or [`TaskDomainError::TaskDeleted`].
    pub fn update_progress(
        &mut self,
        value: f64,
        completion: ProgressCompletion,
        actor: UserId,
        clock: &impl Clock,
    ) -> Result<TaskChange, TaskDomainError> {
        let progress = Progress::new(value)?;
        self.apply(actor, clock, |next, now| {
            next.record_progress(progress, completion, actor, now)
        })
    }

    /// Assigns the task to `assignee`, or unassigns it with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskDeleted`] for deleted tasks.
    pub fn assign_to(
        &mut self,
        assignee: Option<UserId>,
        actor: UserId,
        clock: &impl Clock,
    ) -> Result<TaskChange, TaskDomainError> {
        self.apply(actor, clock, |next, now| {
            Ok(next.reassign(assignee, actor, now))
        })
    }

    /// Replaces the priority.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskDeleted`] for deleted tasks.
    pub fn set_priority(
        &mut self,
        priority: TaskPriority,
        actor: UserId,
        clock: &impl Clock,
    ) -> Result<TaskChange, TaskDomainError> {
        self.apply(actor, clock, |next, _| {
            next.priority = priority;
            Ok(Vec::new())
        })
    }

    /// Replaces or clears the due date.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Validation`] for [`TaskField::DueDate`]
    /// when a new due date lies in the past, or
    /// [`TaskDomainError::TaskDeleted`].
    pub fn set_due_date(
        &mut self,
        due_date: Option<DateTime<Utc>>,
        actor: UserId,
        clock: &impl Clock,
    ) -> Result<TaskChange, TaskDomainError> {
        self.apply(actor, clock, |next, now| {
            next.replace_due_date(due_date, now)?;
            Ok(Vec::new())
        })
    }

    /// Replaces or clears the start date.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskDeleted`] for deleted tasks.
    pub fn set_start_date(
        &mut self,
        start_date: Option<DateTime<Utc>>,
        actor: UserId,
        clock: &impl Clock,
    ) -> Result<TaskChange, TaskDomainError> {
        self.apply(actor, clock, |next, _| {
            next.start_date = start_date;
            Ok(Vec::new())
        })
    }

    /// Replaces or clears the estimated effort.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Validation`] for
    /// [`TaskField::EstimatedHours`] when the value is negative or above
    /// [`Hours::MAX`], or [`TaskDomainError::TaskDeleted`].
    pub fn set_estimated_hours(
        &mut self,
        hours: Option<i64>,
        actor: UserId,
        clock: &impl Clock,
    ) -> Result<TaskChange, TaskDomainError> {
        let validated = hours
            .map(|value| Hours::new(TaskField::EstimatedHours, value))
            .transpose()?;
        self.apply(actor, clock, |next, _| {
            next.estimated_hours = validated;
            Ok(Vec::new())
        })
    }

    /// Replaces or clears the actual effort.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Validation`] for
    /// [`TaskField::ActualHours`] when the value is negative or above
    /// [`Hours::MAX`], or [`TaskDomainError::TaskDeleted`].
    pub fn set_actual_hours(
        &mut self,
        hours: Option<i64>,
        actor: UserId,
        clock: &impl Clock,
    ) -> Result<TaskChange, TaskDomainError> {
        let validated = hours
            .map(|value| Hours::new(TaskField::ActualHours, value))
            .transpose()?;
        self.apply(actor, clock, |next, _| {
            next.actual_hours = validated;
            Ok(Vec::new())
        })
    }

    /// Replaces or clears the tags.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Validation`] for [`TaskField::Tags`] when
    /// the tag string is too long, or [`TaskDomainError::TaskDeleted`].
    pub fn set_tags(
        &mut self,
        tags: Option<&str>,
        actor: UserId,
        clock: &impl Clock,
    ) -> Result<TaskChange, TaskDomainError> {
        let validated = tags.map(Tags::parse).transpose()?.flatten();
        self.apply(actor, clock, |next, _| {
            next.tags = validated;
            Ok(Vec::new())
        })
    }

    /// Moves the task to a new position in manual ordering.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskDeleted`] for deleted tasks.
    pub fn set_order_index(
        &mut self,
        order_index: i32,
        actor: UserId,
        clock: &impl Clock,
    ) -> Result<TaskChange, TaskDomainError> {
        self.apply(actor, clock, |next, _| {
            next.order_index = order_index;
            Ok(Vec::new())
        })
    }

    /// Marks the task as blocked for `reason`.
    ///
    /// Blocking again with the same reason changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Validation`] for
    /// [`TaskField::BlockedReason`] when the reason is blank, or
    /// [`TaskDomainError::TaskDeleted`].
    pub fn block(
        &mut self,
        reason: &str,
        actor: UserId,
        clock: &impl Clock,
    ) -> Result<TaskChange, TaskDomainError> {
        let validated = BlockReason::new(reason)?;
        self.apply(actor, clock, |next, _| {
            next.blocked_reason = Some(validated);
            Ok(Vec::new())
        })
    }

    /// Clears the blocked flag and its reason.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskDeleted`] for deleted tasks.
    pub fn unblock(
        &mut self,
        actor: UserId,
        clock: &impl Clock,
    ) -> Result<TaskChange, TaskDomainError> {
        self.apply(actor, clock, |next, _| {
            next.blocked_reason = None;
            Ok(Vec::new())
        })
    }

    /// Makes the task a subtask of `parent`, or a top-level task with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Validation`] for [`TaskField::ParentTask`]
    /// when the parent is the task itself, one of its descendants, or in a
    /// different project, or [`TaskDomainError::TaskDeleted`].
    pub fn set_parent(
        &mut self,
        parent: Option<&ParentLink>,
        actor: UserId,
        clock: &impl Clock,
    ) -> Result<TaskChange, TaskDomainError> {
        if let Some(link) = parent {
            link.validate_for(self.id, self.project_id)?;
        }
        let parent_id = parent.map(ParentLink::id);
        self.apply(actor, clock, |next, _| {
            next.parent_id = parent_id;
            Ok(Vec::new())
        })
    }

    /// Applies several field changes at once, recording one history entry per
    /// changed field.
    ///
    /// A requested status equal to the current one is left alone. The status
    /// change is applied before progress, so a progress of 100 in the same
    /// update still completes the task.
    ///
    /// # Errors
    ///
    /// Returns the first validation or transition error; nothing is applied
    /// in that case. Moving to `Done` together with a progress below 100 is
    /// a [`TaskDomainError::Validation`] for [`TaskField::Progress`].
    pub fn apply_update(
        &mut self,
        update: TaskUpdate,
        completion: ProgressCompletion,
        actor: UserId,
        clock: &impl Clock,
    ) -> Result<TaskChange, TaskDomainError> {
        let validated = update.validate()?;
        self.apply(actor, clock, |next, now| {
            next.apply_validated(validated, completion, actor, now)
        })
    }

    /// Marks the task as deleted. Subtasks are not touched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskDeleted`] when already deleted.
    pub fn soft_delete(
        &mut self,
        actor: UserId,
        clock: &impl Clock,
    ) -> Result<TaskChange, TaskDomainError> {
        self.ensure_not_deleted()?;
        let now = clock.utc();
        self.audit.mark_deleted(actor, now);
        Ok(TaskChange::events_only(vec![TaskEvent::Deleted {
            task_id: self.id,
            actor,
            occurred_at: now,
        }]))
    }

    /// Clears the deletion marker of a soft-deleted task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskNotDeleted`] when the task is live.
    pub fn restore(
        &mut self,
        actor: UserId,
        clock: &impl Clock,
    ) -> Result<TaskChange, TaskDomainError> {
        if !self.is_deleted() {
            return Err(TaskDomainError::TaskNotDeleted(self.id));
        }
        let now = clock.utc();
        self.audit.clear_deletion(actor, now);
        Ok(TaskChange::events_only(vec![TaskEvent::Restored {
            task_id: self.id,
            actor,
            occurred_at: now,
        }]))
    }

    /// Runs `mutate` on a copy and commits it when it succeeds and changed
    /// at least one tracked field.
    fn apply<F>(
        &mut self,
        actor: UserId,
        clock: &impl Clock,
        mutate: F,
    ) -> Result<TaskChange, TaskDomainError>
    where
        F: FnOnce(&mut Self, DateTime<Utc>) -> Result<Vec<TaskEvent>, TaskDomainError>,
    {
        self.ensure_not_deleted()?;
        let now = clock.utc();
        let mut next = self.clone();
        let events = mutate(&mut next, now)?;
        let history = diff(self, &next, actor, &TaskField::ALL, now);
        if history.is_empty() {
            return Ok(TaskChange::default());
        }
        next.audit.touch(actor, now);
        *self = next;
        Ok(TaskChange { history, events })
    }

    fn ensure_not_deleted(&self) -> Result<(), TaskDomainError> {
        if self.is_deleted() {
            return Err(TaskDomainError::TaskDeleted(self.id));
        }
        Ok(())
    }

    /// Moves to `to`. `forced` skips the transition table.
    fn transition(
        &mut self,
        to: TaskStatus,
        actor: UserId,
        now: DateTime<Utc>,
        forced: bool,
    ) -> Result<Vec<TaskEvent>, TaskDomainError> {
        let from = self.status;
        let permitted = from.can_transition_to(to);
        if !permitted && !forced {
            return Err(TaskDomainError::InvalidStateTransition {
                task_id: self.id,
                from,
                to,
            });
        }

        self.status = to;
        let mut events = vec![TaskEvent::StatusChanged {
            task_id: self.id,
            from,
            to,
            actor,
            occurred_at: now,
        }];
        if to == TaskStatus::Done {
            self.completed_at = Some(now);
            self.progress = Some(Progress::COMPLETE);
            events.push(TaskEvent::Completed {
                task_id: self.id,
                actor,
                forced: !permitted,
                occurred_at: now,
            });
        } else if from == TaskStatus::Done {
            self.completed_at = None;
        }
        Ok(events)
    }

    fn record_progress(
        &mut self,
        progress: Progress,
        completion: ProgressCompletion,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<TaskEvent>, TaskDomainError> {
        self.progress = Some(progress);
        if progress.is_complete() && self.status != TaskStatus::Done {
            let forced = completion == ProgressCompletion::Forced;
            return self.transition(TaskStatus::Done, actor, now, forced);
        }
        Ok(Vec::new())
    }

    fn reassign(
        &mut self,
        assignee: Option<UserId>,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Vec<TaskEvent> {
        if self.assignee == assignee {
            return Vec::new();
        }
        let previous = std::mem::replace(&mut self.assignee, assignee);
        vec![TaskEvent::Assigned {
            task_id: self.id,
            from: previous,
            to: assignee,
            actor,
            occurred_at: now,
        }]
    }

    /// Only a changed due date is checked against the clock, so resubmitting
    /// an overdue date is not an error.
    fn replace_due_date(
        &mut self,
        due_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<(), TaskDomainError> {
        if due_date == self.due_date {
            return Ok(());
        }
        if let Some(date) = due_date {
            ensure_not_past(date, now)?;
        }
        self.due_date = due_date;
        Ok(())
    }

    fn apply_validated(
        &mut self,
        update: ValidatedUpdate,
        completion: ProgressCompletion,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<TaskEvent>, TaskDomainError> {
        let mut events = Vec::new();
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(due_date) = update.due_date {
            self.replace_due_date(due_date, now)?;
        }
        if let Some(start_date) = update.start_date {
            self.start_date = start_date;
        }
        if let Some(hours) = update.estimated_hours {
            self.estimated_hours = hours;
        }
        if let Some(hours) = update.actual_hours {
            self.actual_hours = hours;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        if let Some(order_index) = update.order_index {
            self.order_index = order_index;
        }
        if let Some(assignee) = update.assignee {
            events.extend(self.reassign(assignee, actor, now));
        }
        let status = update.status.filter(|status| *status != self.status);
        if status == Some(TaskStatus::Done)
            && update.progress.is_some_and(|progress| !progress.is_complete())
        {
            return Err(TaskDomainError::validation(
                TaskField::Progress,
                "progress must be 100 when completing a task",
            ));
        }
        if let Some(status) = status {
            events.extend(self.transition(status, actor, now, false)?);
        }
        if let Some(progress) = update.progress {
            events.extend(self.record_progress(progress, completion, actor, now)?);
        }
        Ok(events)
    }
}

fn ensure_not_past(due_date: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), TaskDomainError> {
    if due_date < now {
        return Err(TaskDomainError::validation(
            TaskField::DueDate,
            format!("due date {} is in the past", due_date.to_rfc3339()),
        ));
    }
    Ok(())
}
