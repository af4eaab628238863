//! Access gate port answering whether a user may act on a project's tasks.

use crate::task::domain::{ProjectId, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for access gate operations.
pub type AccessGateResult<T> = Result<T, AccessGateError>;

/// Project access contract consumed by every task operation.
///
/// Callers check [`ProjectAccessGate::project_exists`] first so that a
/// missing project is reported as not found rather than as denied.
#[async_trait]
pub trait ProjectAccessGate: Send + Sync {
    /// Returns `true` when the project exists.
    async fn project_exists(&self, project_id: ProjectId) -> AccessGateResult<bool>;

    /// Returns `true` when `user_id` owns the project, the project is
    /// public, or `user_id` is a registered member.
    ///
    /// Returns `false` for unknown projects.
    async fn has_access(&self, project_id: ProjectId, user_id: UserId) -> AccessGateResult<bool>;
}

/// Errors returned by access gate implementations.
#[derive(Debug, Clone, Error)]
pub enum AccessGateError {
    /// Backing store failure.
    #[error("access lookup failed: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AccessGateError {
    /// Wraps a backing store error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
