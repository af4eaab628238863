//! In-memory project directory implementing the access gate.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{ProjectAccess, ProjectId, UserId},
    ports::{AccessGateError, AccessGateResult, ProjectAccessGate},
};

/// Thread-safe in-memory registry of project access snapshots.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectDirectory {
    projects: Arc<RwLock<HashMap<ProjectId, ProjectAccess>>>,
}

impl InMemoryProjectDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces a project.
    ///
    /// # Errors
    ///
    /// Returns [`AccessGateError::Persistence`] when the lock is poisoned.
    pub fn register(&self, project: ProjectAccess) -> AccessGateResult<()> {
        let mut projects = self
            .projects
            .write()
            .map_err(|err| AccessGateError::persistence(std::io::Error::other(err.to_string())))?;
        projects.insert(project.project_id(), project);
        Ok(())
    }

    fn lookup<T>(
        &self,
        project_id: ProjectId,
        read: impl FnOnce(Option<&ProjectAccess>) -> T,
    ) -> AccessGateResult<T> {
        let projects = self
            .projects
            .read()
            .map_err(|err| AccessGateError::persistence(std::io::Error::other(err.to_string())))?;
        Ok(read(projects.get(&project_id)))
    }
}

#[async_trait]
impl ProjectAccessGate for InMemoryProjectDirectory {
    async fn project_exists(&self, project_id: ProjectId) -> AccessGateResult<bool> {
        self.lookup(project_id, |project| project.is_some())
    }

    async fn has_access(&self, project_id: ProjectId, user_id: UserId) -> AccessGateResult<bool> {
        self.lookup(project_id, |project| {
            project.is_some_and(|access| access.grants(user_id))
        })
    }
}
