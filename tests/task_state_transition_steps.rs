//! Behaviour tests for the task lifecycle state machine.

#[path = "task_state_transition_steps/mod.rs"]
mod task_state_transition_steps_defs;

use rstest_bdd_macros::scenario;
use task_state_transition_steps_defs::world::{TaskTransitionWorld, world};

#[scenario(
    path = "tests/features/task_state_transitions.feature",
    name = "Create a task with default values"
)]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_with_defaults(world: TaskTransitionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_state_transitions.feature",
    name = "Completing a reviewed task forces full progress"
)]
#[tokio::test(flavor = "multi_thread")]
async fn complete_reviewed_task(world: TaskTransitionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_state_transitions.feature",
    name = "Reject restarting a cancelled task"
)]
#[tokio::test(flavor = "multi_thread")]
async fn reject_restarting_cancelled_task(world: TaskTransitionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_state_transitions.feature",
    name = "Reject negative estimated hours"
)]
#[tokio::test(flavor = "multi_thread")]
async fn reject_negative_estimated_hours(world: TaskTransitionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_state_transitions.feature",
    name = "Reject blocking without a reason"
)]
#[tokio::test(flavor = "multi_thread")]
async fn reject_blocking_without_reason(world: TaskTransitionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_state_transitions.feature",
    name = "Reject changes from users outside the project"
)]
#[tokio::test(flavor = "multi_thread")]
async fn reject_changes_from_outsiders(world: TaskTransitionWorld) {
    let _ = world;
}
