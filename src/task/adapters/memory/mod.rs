//! In-memory adapters for tests and local development.

mod project;
mod task;

pub use project::InMemoryProjectDirectory;
pub use task::InMemoryTaskRepository;
