//! Given steps for task lifecycle BDD scenarios.

use super::world::{TaskTransitionWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use tasklane::task::{
    domain::{NewTask, ProjectAccess, ProjectId, TaskStatus, UserId},
    services::CreateTaskRequest,
};

#[given("project {project_id:i64} is owned by user {owner_id:i64}")]
fn project_owned_by(
    world: &mut TaskTransitionWorld,
    project_id: i64,
    owner_id: i64,
) -> Result<(), eyre::Report> {
    world
        .projects
        .register(ProjectAccess::new(
            ProjectId::new(project_id),
            UserId::new(owner_id),
        ))
        .wrap_err("register scenario project")?;
    world.owner = Some(UserId::new(owner_id));
    Ok(())
}

#[given(r#"a task titled "{title}" in project {project_id:i64}"#)]
fn task_titled(
    world: &mut TaskTransitionWorld,
    title: String,
    project_id: i64,
) -> Result<(), eyre::Report> {
    let owner = world.owner()?;
    let mutation = run_async(world.service.create_task(
        CreateTaskRequest::new(NewTask::new(title, ProjectId::new(project_id))),
        owner,
    ))
    .wrap_err("create task for scenario setup")?;
    world.last_task = Some(mutation.task);
    Ok(())
}

#[given("the task progress is set to {progress:i64}")]
fn task_progress_set(world: &mut TaskTransitionWorld, progress: i64) -> Result<(), eyre::Report> {
    let task = world.task()?;
    let (task_id, owner) = (task.id(), task.creator());
    let value = f64::from(i32::try_from(progress)?);
    let mutation = run_async(world.service.update_progress(task_id, value, owner))
        .wrap_err("record progress in scenario setup")?;
    world.last_task = Some(mutation.task);
    Ok(())
}

#[given(r#"the task has been transitioned to "{status}""#)]
fn task_has_been_transitioned(
    world: &mut TaskTransitionWorld,
    status: String,
) -> Result<(), eyre::Report> {
    let target = TaskStatus::try_from(status.as_str())?;
    let task = world.task()?;
    let (task_id, owner) = (task.id(), task.creator());
    let mutation = run_async(world.service.change_status(task_id, target, owner))
        .wrap_err("transition task in scenario setup")?;
    world.last_task = Some(mutation.task);
    Ok(())
}
