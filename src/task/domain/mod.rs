//! Domain model for the task lifecycle.
//!
//! The domain owns the task aggregate, its status transition table, the
//! audit history diff and the facts emitted by mutations. Nothing here
//! performs I/O: loading, access checks and persistence belong to the
//! services and adapters around it.

mod access;
mod audit;
mod error;
mod event;
mod fields;
mod history;
mod ids;
mod input;
mod policy;
mod priority;
mod status;
mod task;

pub use access::{ProjectAccess, ProjectVisibility};
pub use audit::AuditStamp;
pub use error::{
    ParseTaskFieldError, ParseTaskPriorityError, ParseTaskStatusError, TaskDomainError,
};
pub use event::TaskEvent;
pub use fields::{BlockReason, Hours, Progress, Tags, TaskDescription, TaskField, TaskTitle};
pub use history::{PersistedHistoryData, TaskChange, TaskHistory, diff};
pub use ids::{HistoryId, ProjectId, TaskId, UserId};
pub use input::{NewTask, ParentLink, TaskUpdate};
pub use policy::{ProgressCompletion, TaskPolicy};
pub use priority::TaskPriority;
pub use status::TaskStatus;
pub use task::{PersistedTaskData, Task, UNASSIGNED};

use input::ValidatedUpdate;
