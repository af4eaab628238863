//! Application services for task lifecycle orchestration.

mod lifecycle;

pub use lifecycle::{
    CreateTaskRequest, EntityKind, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService,
    TaskMutation,
};
