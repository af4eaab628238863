//! When steps for task lifecycle BDD scenarios.

use super::world::{TaskTransitionWorld, run_async};
use rstest_bdd_macros::when;
use tasklane::task::{
    domain::{NewTask, ProjectId, TaskStatus, UserId},
    services::CreateTaskRequest,
};

#[when(r#"user {user_id:i64} creates a task titled "{title}" in project {project_id:i64}"#)]
fn user_creates_task(world: &mut TaskTransitionWorld, user_id: i64, title: String, project_id: i64) {
    let request = CreateTaskRequest::new(NewTask::new(title, ProjectId::new(project_id)));
    let result = run_async(world.service.create_task(request, UserId::new(user_id)));
    world.record(result);
}

#[when(r#"the task is transitioned to "{status}""#)]
fn transition_task(world: &mut TaskTransitionWorld, status: String) -> Result<(), eyre::Report> {
    let target = TaskStatus::try_from(status.as_str())?;
    let task = world.task()?;
    let (task_id, owner) = (task.id(), task.creator());
    let result = run_async(world.service.change_status(task_id, target, owner));
    world.record(result);
    Ok(())
}

#[when(r#"the estimated hours are set to "{hours}""#)]
fn set_estimated_hours(world: &mut TaskTransitionWorld, hours: String) -> Result<(), eyre::Report> {
    let value: i64 = hours.parse()?;
    let task = world.task()?;
    let (task_id, owner) = (task.id(), task.creator());
    let result = run_async(
        world
            .service
            .set_estimated_hours(task_id, Some(value), owner),
    );
    world.record(result);
    Ok(())
}

#[when("the task is blocked without a reason")]
fn block_without_reason(world: &mut TaskTransitionWorld) -> Result<(), eyre::Report> {
    let task = world.task()?;
    let (task_id, owner) = (task.id(), task.creator());
    let result = run_async(world.service.block(task_id, "", owner));
    world.record(result);
    Ok(())
}

#[when(r#"user {user_id:i64} renames the task to "{title}""#)]
fn user_renames_task(
    world: &mut TaskTransitionWorld,
    user_id: i64,
    title: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let result = run_async(
        world
            .service
            .rename(task_id, &title, UserId::new(user_id)),
    );
    world.record(result);
    Ok(())
}
