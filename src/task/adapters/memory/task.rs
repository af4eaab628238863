//! In-memory repository for task lifecycle tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{PersistedTaskData, ProjectId, Task, TaskHistory, TaskId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult, TaskWrite},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    history: HashMap<TaskId, Vec<TaskHistory>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

impl InMemoryTaskState {
    /// Returns the stored version of `task` when it matches the loaded one.
    fn checked_version(&self, task: &Task) -> TaskRepositoryResult<u64> {
        let stored_version = self
            .tasks
            .get(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?
            .version();
        if stored_version != task.version() {
            return Err(TaskRepositoryError::Conflict {
                task_id: task.id(),
                expected: task.version(),
                actual: stored_version,
            });
        }
        Ok(stored_version)
    }

    fn apply(&mut self, task: &Task, history: &[TaskHistory], stored_version: u64) -> Task {
        let stored = at_version(task, stored_version.saturating_add(1));
        self.tasks.insert(task.id(), stored.clone());
        self.history
            .entry(task.id())
            .or_default()
            .extend_from_slice(history);
        stored
    }
}

/// Returns a copy of `task` stamped with `version`.
fn at_version(task: &Task, version: u64) -> Task {
    Task::from_persisted(PersistedTaskData {
        version,
        ..task.to_persisted()
    })
}

fn live_tasks<'a>(
    state: &'a InMemoryTaskState,
    predicate: impl Fn(&Task) -> bool + 'a,
) -> impl Iterator<Item = &'a Task> + 'a {
    state
        .tasks
        .values()
        .filter(move |task| !task.is_deleted() && predicate(task))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task, history: &[TaskHistory]) -> TaskRepositoryResult<Task> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }

        state.tasks.insert(task.id(), task.clone());
        state
            .history
            .entry(task.id())
            .or_default()
            .extend_from_slice(history);
        Ok(task.clone())
    }

    async fn update(&self, task: &Task, history: &[TaskHistory]) -> TaskRepositoryResult<Task> {
        let mut state = self.write()?;
        let stored_version = state.checked_version(task)?;
        Ok(state.apply(task, history, stored_version))
    }

    async fn update_all(&self, batch: &[TaskWrite]) -> TaskRepositoryResult<Vec<Task>> {
        let mut state = self.write()?;
        let versions = batch
            .iter()
            .map(|write| state.checked_version(&write.task))
            .collect::<TaskRepositoryResult<Vec<u64>>>()?;
        Ok(batch
            .iter()
            .zip(versions)
            .map(|(write, version)| state.apply(&write.task, &write.history, version))
            .collect())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state
            .tasks
            .get(&id)
            .filter(|task| !task.is_deleted())
            .cloned())
    }

    async fn find_including_deleted(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list_by_project(&self, project_id: ProjectId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = live_tasks(&state, |task| task.project_id() == project_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (task.order_index(), task.created_at()));
        Ok(tasks)
    }

    async fn list_children(&self, parent_id: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let mut children: Vec<Task> =
            live_tasks(&state, |task| task.parent_id() == Some(parent_id))
                .cloned()
                .collect();
        children.sort_by_key(|task| (task.order_index(), task.created_at()));
        Ok(children)
    }

    async fn history_for(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<TaskHistory>> {
        let state = self.read()?;
        let mut records = state.history.get(&task_id).cloned().unwrap_or_default();
        records.sort_by_key(TaskHistory::changed_at);
        Ok(records)
    }
}
