//! Port contracts for task lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod access;
pub mod repository;

pub use access::{AccessGateError, AccessGateResult, ProjectAccessGate};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult, TaskWrite};
