//! Shared world state for task lifecycle BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use tasklane::task::{
    adapters::memory::{InMemoryProjectDirectory, InMemoryTaskRepository},
    domain::{Task, UserId},
    services::{TaskLifecycleResult, TaskLifecycleService, TaskMutation},
};

/// Service type used by the BDD world.
pub type TestTaskService =
    TaskLifecycleService<InMemoryTaskRepository, InMemoryProjectDirectory, DefaultClock>;

/// Scenario world for task lifecycle behaviour tests.
pub struct TaskTransitionWorld {
    pub service: TestTaskService,
    pub projects: InMemoryProjectDirectory,
    pub owner: Option<UserId>,
    pub last_task: Option<Task>,
    pub last_result: Option<TaskLifecycleResult<TaskMutation>>,
}

impl TaskTransitionWorld {
    /// Creates a world with no projects and no tasks.
    #[must_use]
    pub fn new() -> Self {
        let projects = InMemoryProjectDirectory::new();
        let service = TaskLifecycleService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(projects.clone()),
            Arc::new(DefaultClock),
        );

        Self {
            service,
            projects,
            owner: None,
            last_task: None,
            last_result: None,
        }
    }

    /// Returns the task the scenario is working on.
    ///
    /// # Errors
    ///
    /// Returns an error when no task has been created yet.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.last_task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }

    /// Returns the owner of the scenario project.
    ///
    /// # Errors
    ///
    /// Returns an error when no project has been registered yet.
    pub fn owner(&self) -> Result<UserId, eyre::Report> {
        self.owner
            .ok_or_else(|| eyre::eyre!("missing project owner in scenario world"))
    }

    /// Stores the outcome of a `When` step, keeping the task current on
    /// success.
    pub fn record(&mut self, result: TaskLifecycleResult<TaskMutation>) {
        if let Ok(ref mutation) = result {
            self.last_task = Some(mutation.task.clone());
        }
        self.last_result = Some(result);
    }
}

impl Default for TaskTransitionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskTransitionWorld {
    TaskTransitionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
