//! Service layer orchestrating access-checked task lifecycle operations.
//!
//! Every mutation loads the live task, checks that its project exists and
//! that the actor may act on it, runs the domain operation and persists the
//! task together with its history in one repository call. Mutations that
//! change nothing are not written.

use crate::task::{
    domain::{
        NewTask, ParentLink, ProjectId, Task, TaskChange, TaskDomainError, TaskEvent,
        TaskField, TaskHistory, TaskId, TaskPolicy, TaskPriority, TaskStatus, TaskUpdate, UserId,
    },
    ports::{AccessGateError, ProjectAccessGate, TaskRepository, TaskRepositoryError, TaskWrite},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTaskRequest {
    draft: NewTask,
    parent_id: Option<TaskId>,
}

impl CreateTaskRequest {
    /// Creates a request for a top-level task.
    #[must_use]
    pub const fn new(draft: NewTask) -> Self {
        Self {
            draft,
            parent_id: None,
        }
    }

    /// Creates the task as a subtask of `parent_id`.
    #[must_use]
    pub const fn with_parent(mut self, parent_id: TaskId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Outcome of a committed mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskMutation {
    /// Task as stored after the mutation.
    pub task: Task,
    /// History records written with the task.
    pub history: Vec<TaskHistory>,
    /// Facts emitted by the mutation, for the caller to deliver.
    pub events: Vec<TaskEvent>,
}

impl TaskMutation {
    fn new(task: Task, change: TaskChange) -> Self {
        Self {
            task,
            history: change.history,
            events: change.events,
        }
    }

    /// Returns `true` when the mutation changed nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.history.is_empty() && self.events.is_empty()
    }

    /// Returns the fields recorded in history, in record order.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<TaskField> {
        self.history.iter().map(TaskHistory::field).collect()
    }
}

/// Kind of entity reported by [`TaskLifecycleError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A task.
    Task,
    /// A project.
    Project,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task => f.write_str("task"),
            Self::Project => f.write_str("project"),
        }
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation or transition rules rejected the operation.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// Access lookup failed.
    #[error(transparent)]
    AccessGate(#[from] AccessGateError),
    /// The task or project does not exist, or the task is deleted.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of the missing entity.
        entity: EntityKind,
        /// Identifier that was looked up.
        id: String,
    },
    /// The actor may not act on the project's tasks.
    #[error("user {user_id} has no access to project {project_id}")]
    AccessDenied {
        /// Project the task belongs to.
        project_id: ProjectId,
        /// Acting user.
        user_id: UserId,
    },
}

impl TaskLifecycleError {
    fn task_not_found(id: TaskId) -> Self {
        Self::NotFound {
            entity: EntityKind::Task,
            id: id.to_string(),
        }
    }

    /// Returns the HTTP status code a transport layer should answer with.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Domain(
                TaskDomainError::Validation { .. }
                | TaskDomainError::InvalidStateTransition { .. },
            ) => 400,
            Self::AccessDenied { .. } => 403,
            Self::NotFound { .. }
            | Self::Domain(TaskDomainError::TaskDeleted(_))
            | Self::Repository(TaskRepositoryError::NotFound(_)) => 404,
            Self::Domain(TaskDomainError::TaskNotDeleted(_))
            | Self::Repository(
                TaskRepositoryError::Conflict { .. } | TaskRepositoryError::DuplicateTask(_),
            ) => 409,
            Self::Repository(TaskRepositoryError::Persistence(_)) | Self::AccessGate(_) => 500,
        }
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<R, G, C>
where
    R: TaskRepository,
    G: ProjectAccessGate,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    access: Arc<G>,
    clock: Arc<C>,
    policy: TaskPolicy,
}

impl<R, G, C> TaskLifecycleService<R, G, C>
where
    R: TaskRepository,
    G: ProjectAccessGate,
    C: Clock + Send + Sync,
{
    /// Creates a service using the default [`TaskPolicy`].
    #[must_use]
    pub fn new(repository: Arc<R>, access: Arc<G>, clock: Arc<C>) -> Self {
        Self {
            repository,
            access,
            clock,
            policy: TaskPolicy::default(),
        }
    }

    /// Replaces the lifecycle policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: TaskPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the lifecycle policy in force.
    #[must_use]
    pub const fn policy(&self) -> TaskPolicy {
        self.policy
    }

    /// Creates a task in `Todo` on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the project or parent is
    /// missing, [`TaskLifecycleError::AccessDenied`] when the actor lacks
    /// project access, [`TaskLifecycleError::Domain`] on invalid input, or
    /// [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn create_task(
        &self,
        request: CreateTaskRequest,
        actor: UserId,
    ) -> TaskLifecycleResult<TaskMutation> {
        let CreateTaskRequest { draft, parent_id } = request;
        self.authorize(draft.project_id(), actor).await?;

        let prepared = match parent_id {
            Some(id) => draft.with_parent(self.parent_link(id).await?),
            None => draft,
        };
        let (task, change) = Task::create(prepared, actor, &*self.clock)?;
        let stored = self.repository.store(&task, &change.history).await?;
        info!(
            task_id = %stored.id(),
            project_id = %stored.project_id(),
            actor = %actor,
            "task created"
        );
        Ok(TaskMutation::new(stored, change))
    }

    /// Returns a live task visible to `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for missing or deleted tasks
    /// and [`TaskLifecycleError::AccessDenied`] without project access.
    pub async fn get_task(&self, task_id: TaskId, actor: UserId) -> TaskLifecycleResult<Task> {
        let task = self.load(task_id).await?;
        self.authorize(task.project_id(), actor).await?;
        debug!(task_id = %task_id, actor = %actor, "task loaded");
        Ok(task)
    }

    /// Lists the live tasks of a project in manual order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for unknown projects and
    /// [`TaskLifecycleError::AccessDenied`] without project access.
    pub async fn list_project_tasks(
        &self,
        project_id: ProjectId,
        actor: UserId,
    ) -> TaskLifecycleResult<Vec<Task>> {
        self.authorize(project_id, actor).await?;
        let tasks = self.repository.list_by_project(project_id).await?;
        debug!(project_id = %project_id, count = tasks.len(), "project tasks listed");
        Ok(tasks)
    }

    /// Lists the live direct subtasks of a task.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_task`].
    pub async fn list_subtasks(
        &self,
        task_id: TaskId,
        actor: UserId,
    ) -> TaskLifecycleResult<Vec<Task>> {
        let parent = self.get_task(task_id, actor).await?;
        let children = self.repository.list_children(parent.id()).await?;
        debug!(task_id = %task_id, count = children.len(), "subtasks listed");
        Ok(children)
    }

    /// Returns the audit history of a task, oldest first.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_task`].
    pub async fn task_history(
        &self,
        task_id: TaskId,
        actor: UserId,
    ) -> TaskLifecycleResult<Vec<TaskHistory>> {
        let task = self.get_task(task_id, actor).await?;
        Ok(self.repository.history_for(task.id()).await?)
    }

    /// Renames a task.
    ///
    /// # Errors
    ///
    /// Returns the lookup and access errors of [`Self::get_task`], domain
    /// validation errors, and repository errors including conflicts.
    pub async fn rename(
        &self,
        task_id: TaskId,
        title: &str,
        actor: UserId,
    ) -> TaskLifecycleResult<TaskMutation> {
        self.mutate(task_id, actor, "rename", |task, clock| {
            task.rename(title, actor, clock)
        })
        .await
    }

    /// Replaces or clears a task description.
    ///
    /// # Errors
    ///
    /// See [`Self::rename`].
    pub async fn update_description(
        &self,
        task_id: TaskId,
        description: Option<&str>,
        actor: UserId,
    ) -> TaskLifecycleResult<TaskMutation> {
        self.mutate(task_id, actor, "update_description", |task, clock| {
            task.update_description(description, actor, clock)
        })
        .await
    }

    /// Moves a task to `status` following the transition table.
    ///
    /// # Errors
    ///
    /// See [`Self::rename`]; a disallowed transition returns
    /// [`TaskDomainError::InvalidStateTransition`].
    pub async fn change_status(
        &self,
        task_id: TaskId,
        status: TaskStatus,
        actor: UserId,
    ) -> TaskLifecycleResult<TaskMutation> {
        self.mutate(task_id, actor, "change_status", |task, clock| {
            task.change_status(status, actor, clock)
        })
        .await
    }

    /// Records progress, completing the task at 100 according to the
    /// configured [`TaskPolicy::progress_completion`].
    ///
    /// # Errors
    ///
    /// See [`Self::rename`].
    pub async fn update_progress(
        &self,
        task_id: TaskId,
        progress: f64,
        actor: UserId,
    ) -> TaskLifecycleResult<TaskMutation> {
        let completion = self.policy.progress_completion;
        self.mutate(task_id, actor, "update_progress", |task, clock| {
            task.update_progress(progress, completion, actor, clock)
        })
        .await
    }

    /// Assigns a task, or unassigns it with `None`.
    ///
    /// # Errors
    ///
    /// See [`Self::rename`].
    pub async fn assign(
        &self,
        task_id: TaskId,
        assignee: Option<UserId>,
        actor: UserId,
    ) -> TaskLifecycleResult<TaskMutation> {
        self.mutate(task_id, actor, "assign", |task, clock| {
            task.assign_to(assignee, actor, clock)
        })
        .await
    }

    /// Replaces the priority of a task.
    ///
    /// # Errors
    ///
    /// See [`Self::rename`].
    pub async fn set_priority(
        &self,
        task_id: TaskId,
        priority: TaskPriority,
        actor: UserId,
    ) -> TaskLifecycleResult<TaskMutation> {
        self.mutate(task_id, actor, "set_priority", |task, clock| {
            task.set_priority(priority, actor, clock)
        })
        .await
    }

    /// Replaces or clears the due date of a task.
    ///
    /// # Errors
    ///
    /// See [`Self::rename`].
    pub async fn set_due_date(
        &self,
        task_id: TaskId,
        due_date: Option<DateTime<Utc>>,
        actor: UserId,
    ) -> TaskLifecycleResult<TaskMutation> {
        self.mutate(task_id, actor, "set_due_date", |task, clock| {
            task.set_due_date(due_date, actor, clock)
        })
        .await
    }

    /// Replaces or clears the start date of a task.
    ///
    /// # Errors
    ///
    /// See [`Self::rename`].
    pub async fn set_start_date(
        &self,
        task_id: TaskId,
        start_date: Option<DateTime<Utc>>,
        actor: UserId,
    ) -> TaskLifecycleResult<TaskMutation> {
        self.mutate(task_id, actor, "set_start_date", |task, clock| {
            task.set_start_date(start_date, actor, clock)
        })
        .await
    }

    /// Replaces or clears the estimated effort of a task.
    ///
    /// # Errors
    ///
    /// See [`Self::rename`].
    pub async fn set_estimated_hours(
        &self,
        task_id: TaskId,
        hours: Option<i64>,
        actor: UserId,
    ) -> TaskLifecycleResult<TaskMutation> {
        self.mutate(task_id, actor, "set_estimated_hours", |task, clock| {
            task.set_estimated_hours(hours, actor, clock)
        })
        .await
    }

    /// Replaces or clears the actual effort of a task.
    ///
    /// # Errors
    ///
    /// See [`Self::rename`].
    pub async fn set_actual_hours(
        &self,
        task_id: TaskId,
        hours: Option<i64>,
        actor: UserId,
    ) -> TaskLifecycleResult<TaskMutation> {
        self.mutate(task_id, actor, "set_actual_hours", |task, clock| {
            task.set_actual_hours(hours, actor, clock)
        })
        .await
    }

    /// Replaces or clears the tags of a task.
    ///
    /// # Errors
    ///
    /// See [`Self::rename`].
    pub async fn set_tags(
        &self,
        task_id: TaskId,
        tags: Option<&str>,
        actor: UserId,
    ) -> TaskLifecycleResult<TaskMutation> {
        self.mutate(task_id, actor, "set_tags", |task, clock| {
            task.set_tags(tags, actor, clock)
        })
        .await
    }

    /// Moves a task within the project's manual ordering.
    ///
    /// # Errors
    ///
    /// See [`Self::rename`].
    pub async fn set_order_index(
        &self,
        task_id: TaskId,
        order_index: i32,
        actor: UserId,
    ) -> TaskLifecycleResult<TaskMutation> {
        self.mutate(task_id, actor, "set_order_index", |task, clock| {
            task.set_order_index(order_index, actor, clock)
        })
        .await
    }

    /// Blocks a task for `reason`.
    ///
    /// # Errors
    ///
    /// See [`Self::rename`].
    pub async fn block(
        &self,
        task_id: TaskId,
        reason: &str,
        actor: UserId,
    ) -> TaskLifecycleResult<TaskMutation> {
        self.mutate(task_id, actor, "block", |task, clock| {
            task.block(reason, actor, clock)
        })
        .await
    }

    /// Unblocks a task.
    ///
    /// # Errors
    ///
    /// See [`Self::rename`].
    pub async fn unblock(&self, task_id: TaskId, actor: UserId) -> TaskLifecycleResult<TaskMutation> {
        self.mutate(task_id, actor, "unblock", |task, clock| {
            task.unblock(actor, clock)
        })
        .await
    }

    /// Moves a task under `parent_id`, or to the top level with `None`.
    ///
    /// # Errors
    ///
    /// See [`Self::rename`]; an unknown or deleted parent returns
    /// [`TaskLifecycleError::NotFound`].
    pub async fn set_parent(
        &self,
        task_id: TaskId,
        parent_id: Option<TaskId>,
        actor: UserId,
    ) -> TaskLifecycleResult<TaskMutation> {
        let mut task = self.load(task_id).await?;
        self.authorize(task.project_id(), actor).await?;
        let link = match parent_id {
            Some(id) => Some(self.parent_link(id).await?),
            None => None,
        };
        let change = task.set_parent(link.as_ref(), actor, &*self.clock)?;
        self.commit(task, change, actor, "set_parent").await
    }

    /// Applies a batch of field changes in one mutation.
    ///
    /// # Errors
    ///
    /// See [`Self::rename`]. Nothing is applied when any field is invalid.
    pub async fn update_task(
        &self,
        task_id: TaskId,
        update: TaskUpdate,
        actor: UserId,
    ) -> TaskLifecycleResult<TaskMutation> {
        let completion = self.policy.progress_completion;
        self.mutate(task_id, actor, "update_task", |task, clock| {
            task.apply_update(update, completion, actor, clock)
        })
        .await
    }

    /// Soft-deletes a task, and its live descendants when
    /// [`TaskPolicy::cascade_soft_delete`] is set.
    ///
    /// A cascade is written in one repository call, so either the whole
    /// subtree is deleted or nothing is. Descendant deletions are reported
    /// as additional `Deleted` events on the returned mutation.
    ///
    /// # Errors
    ///
    /// See [`Self::rename`].
    pub async fn soft_delete(
        &self,
        task_id: TaskId,
        actor: UserId,
    ) -> TaskLifecycleResult<TaskMutation> {
        if !self.policy.cascade_soft_delete {
            return self
                .mutate(task_id, actor, "soft_delete", |task, clock| {
                    task.soft_delete(actor, clock)
                })
                .await;
        }

        let mut task = self.load(task_id).await?;
        self.authorize(task.project_id(), actor).await?;
        let mut change = task.soft_delete(actor, &*self.clock)?;
        let mut writes = vec![TaskWrite::new(task, change.history.clone())];
        for mut descendant in self.descendants(task_id).await? {
            let cascaded = descendant.soft_delete(actor, &*self.clock)?;
            change.events.extend(cascaded.events);
            writes.push(TaskWrite::new(descendant, cascaded.history));
        }

        let stored = self
            .repository
            .update_all(&writes)
            .await
            .inspect_err(|err| {
                if let TaskRepositoryError::Conflict { task_id: conflicted, .. } = err {
                    warn!(
                        task_id = %task_id,
                        conflicted = %conflicted,
                        "cascading soft delete hit a concurrent modification"
                    );
                }
            })?;
        let root = stored
            .into_iter()
            .next()
            .ok_or_else(|| TaskLifecycleError::task_not_found(task_id))?;
        info!(
            task_id = %task_id,
            actor = %actor,
            cascaded = writes.len().saturating_sub(1),
            "soft delete cascaded to subtasks"
        );
        Ok(TaskMutation::new(root, change))
    }

    /// Restores a soft-deleted task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task never existed
    /// and [`TaskDomainError::TaskNotDeleted`] when it is live.
    pub async fn restore(&self, task_id: TaskId, actor: UserId) -> TaskLifecycleResult<TaskMutation> {
        let mut task = self
            .repository
            .find_including_deleted(task_id)
            .await?
            .ok_or_else(|| TaskLifecycleError::task_not_found(task_id))?;
        self.authorize(task.project_id(), actor).await?;
        let change = task.restore(actor, &*self.clock)?;
        self.commit(task, change, actor, "restore").await
    }

    async fn mutate<F>(
        &self,
        task_id: TaskId,
        actor: UserId,
        operation: &'static str,
        apply: F,
    ) -> TaskLifecycleResult<TaskMutation>
    where
        F: FnOnce(&mut Task, &C) -> Result<TaskChange, TaskDomainError>,
    {
        let mut task = self.load(task_id).await?;
        self.authorize(task.project_id(), actor).await?;
        let change = apply(&mut task, &*self.clock)?;
        self.commit(task, change, actor, operation).await
    }

    async fn commit(
        &self,
        task: Task,
        change: TaskChange,
        actor: UserId,
        operation: &'static str,
    ) -> TaskLifecycleResult<TaskMutation> {
        if change.is_empty() {
            debug!(task_id = %task.id(), operation, "mutation changed nothing");
            return Ok(TaskMutation::new(task, change));
        }

        let stored = self
            .repository
            .update(&task, &change.history)
            .await
            .inspect_err(|err| {
                if let TaskRepositoryError::Conflict {
                    expected, actual, ..
                } = err
                {
                    warn!(
                        task_id = %task.id(),
                        operation,
                        expected,
                        actual,
                        "task modified concurrently"
                    );
                }
            })?;
        info!(
            task_id = %stored.id(),
            actor = %actor,
            operation,
            changed_fields = change.history.len(),
            events = change.events.len(),
            "task mutation committed"
        );
        Ok(TaskMutation::new(stored, change))
    }

    async fn load(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| TaskLifecycleError::task_not_found(task_id))
    }

    /// Checks project existence before access so unknown projects surface
    /// as not found.
    async fn authorize(&self, project_id: ProjectId, actor: UserId) -> TaskLifecycleResult<()> {
        if !self.access.project_exists(project_id).await? {
            return Err(TaskLifecycleError::NotFound {
                entity: EntityKind::Project,
                id: project_id.to_string(),
            });
        }
        if !self.access.has_access(project_id, actor).await? {
            warn!(project_id = %project_id, actor = %actor, "task access denied");
            return Err(TaskLifecycleError::AccessDenied {
                project_id,
                user_id: actor,
            });
        }
        Ok(())
    }

    /// Loads `parent_id` and its ancestor chain, nearest first.
    async fn parent_link(&self, parent_id: TaskId) -> TaskLifecycleResult<ParentLink> {
        let parent = self.load(parent_id).await?;
        let mut ancestors: Vec<TaskId> = Vec::new();
        let mut next = parent.parent_id();
        while let Some(id) = next {
            if id == parent_id || ancestors.contains(&id) {
                break;
            }
            ancestors.push(id);
            next = self
                .repository
                .find_including_deleted(id)
                .await?
                .and_then(|ancestor| ancestor.parent_id());
        }
        Ok(ParentLink::new(&parent, ancestors))
    }

    /// Collects the live descendants of `root`, parents before children.
    async fn descendants(&self, root: TaskId) -> TaskLifecycleResult<Vec<Task>> {
        let mut found: Vec<Task> = Vec::new();
        let mut frontier = vec![root];
        while let Some(parent) = frontier.pop() {
            for child in self.repository.list_children(parent).await? {
                if child.id() == root || found.iter().any(|seen| seen.id() == child.id()) {
                    continue;
                }
                frontier.push(child.id());
                found.push(child);
            }
        }
        Ok(found)
    }
}
