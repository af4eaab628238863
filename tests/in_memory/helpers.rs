//! Shared test helpers for in-memory task integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use tasklane::task::{
    adapters::memory::{InMemoryProjectDirectory, InMemoryTaskRepository},
    domain::{ProjectAccess, ProjectId, UserId},
    services::TaskLifecycleService,
};

/// Project used by the integration tests.
pub const PROJECT: ProjectId = ProjectId::new(5);
/// Owner of [`PROJECT`].
pub const OWNER: UserId = UserId::new(1);
/// Registered member of [`PROJECT`].
pub const MEMBER: UserId = UserId::new(2);

/// Service type wired to the in-memory adapters.
pub type TestService =
    TaskLifecycleService<InMemoryTaskRepository, InMemoryProjectDirectory, DefaultClock>;

/// Provides a fresh repository for each test.
#[fixture]
pub fn repo() -> Arc<InMemoryTaskRepository> {
    Arc::new(InMemoryTaskRepository::new())
}

/// Provides a directory holding [`PROJECT`] with one member.
#[fixture]
pub fn directory() -> Arc<InMemoryProjectDirectory> {
    let directory = InMemoryProjectDirectory::new();
    directory
        .register(ProjectAccess::new(PROJECT, OWNER).with_members([MEMBER]))
        .expect("project registration should succeed");
    Arc::new(directory)
}

/// Provides a service sharing the `repo` and `directory` fixtures.
#[fixture]
pub fn service(
    repo: Arc<InMemoryTaskRepository>,
    directory: Arc<InMemoryProjectDirectory>,
) -> (TestService, Arc<InMemoryTaskRepository>) {
    (
        TaskLifecycleService::new(Arc::clone(&repo), directory, Arc::new(DefaultClock)),
        repo,
    )
}
