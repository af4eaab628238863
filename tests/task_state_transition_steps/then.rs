//! Then steps for task lifecycle BDD scenarios.

use super::world::{TaskTransitionWorld, run_async};
use rstest_bdd_macros::then;
use tasklane::task::{
    domain::{Progress, TaskDomainError, TaskField, TaskPriority, TaskStatus},
    services::TaskLifecycleError,
};

/// Reloads the scenario task so assertions see what was persisted.
fn stored_task(world: &TaskTransitionWorld) -> Result<tasklane::task::domain::Task, eyre::Report> {
    let task = world.task()?;
    Ok(run_async(world.service.get_task(task.id(), task.creator()))?)
}

fn failure(world: &TaskTransitionWorld) -> Result<&TaskLifecycleError, eyre::Report> {
    match world.last_result.as_ref() {
        Some(Err(err)) => Ok(err),
        Some(Ok(mutation)) => Err(eyre::eyre!("expected failure, got {mutation:?}")),
        None => Err(eyre::eyre!("missing mutation result")),
    }
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &TaskTransitionWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())?;
    let task = stored_task(world)?;
    eyre::ensure!(
        task.status() == expected,
        "expected status {expected}, found {}",
        task.status()
    );
    Ok(())
}

#[then(r#"the task priority is "{priority}""#)]
fn task_priority_is(world: &TaskTransitionWorld, priority: String) -> Result<(), eyre::Report> {
    let expected = TaskPriority::try_from(priority.as_str())?;
    let task = stored_task(world)?;
    eyre::ensure!(
        task.priority() == expected,
        "expected priority {expected}, found {}",
        task.priority()
    );
    Ok(())
}

#[then(r#"the task title is "{title}""#)]
fn task_title_is(world: &TaskTransitionWorld, title: String) -> Result<(), eyre::Report> {
    let task = stored_task(world)?;
    eyre::ensure!(
        task.title().as_str() == title,
        "expected title {title}, found {}",
        task.title()
    );
    Ok(())
}

#[then("the task progress is {progress:i64}")]
fn task_progress_is(world: &TaskTransitionWorld, progress: i64) -> Result<(), eyre::Report> {
    let expected = Progress::new(f64::from(i32::try_from(progress)?))?;
    let task = stored_task(world)?;
    eyre::ensure!(
        task.progress() == Some(expected),
        "expected progress {expected}, found {:?}",
        task.progress()
    );
    Ok(())
}

#[then("the task has a completion time")]
fn task_has_completion_time(world: &TaskTransitionWorld) -> Result<(), eyre::Report> {
    let task = stored_task(world)?;
    eyre::ensure!(task.completed_at().is_some(), "completed_at is not set");
    Ok(())
}

#[then("the task is not blocked")]
fn task_is_not_blocked(world: &TaskTransitionWorld) -> Result<(), eyre::Report> {
    let task = stored_task(world)?;
    eyre::ensure!(!task.is_blocked(), "task is unexpectedly blocked");
    eyre::ensure!(task.blocked_reason().is_none(), "block reason was kept");
    Ok(())
}

#[then(r#"the mutation fails with an invalid transition from "{from}" to "{to}""#)]
fn fails_with_invalid_transition(
    world: &TaskTransitionWorld,
    from: String,
    to: String,
) -> Result<(), eyre::Report> {
    let expected_from = TaskStatus::try_from(from.as_str())?;
    let expected_to = TaskStatus::try_from(to.as_str())?;
    let err = failure(world)?;
    let TaskLifecycleError::Domain(TaskDomainError::InvalidStateTransition {
        from: actual_from,
        to: actual_to,
        ..
    }) = err
    else {
        return Err(eyre::eyre!("expected InvalidStateTransition error, got {err:?}"));
    };
    eyre::ensure!(
        *actual_from == expected_from && *actual_to == expected_to,
        "expected {expected_from} -> {expected_to}, got {actual_from} -> {actual_to}"
    );
    Ok(())
}

#[then(r#"the mutation fails with a validation error on "{field}""#)]
fn fails_with_validation_error(
    world: &TaskTransitionWorld,
    field: String,
) -> Result<(), eyre::Report> {
    let expected = TaskField::try_from(field.as_str())?;
    let err = failure(world)?;
    let TaskLifecycleError::Domain(TaskDomainError::Validation { field: actual, .. }) = err else {
        return Err(eyre::eyre!("expected validation error, got {err:?}"));
    };
    eyre::ensure!(
        *actual == expected,
        "expected validation error on {expected}, got {actual}"
    );
    eyre::ensure!(err.http_status() == 400, "validation must map to 400");
    Ok(())
}

#[then("the mutation is denied")]
fn mutation_is_denied(world: &TaskTransitionWorld) -> Result<(), eyre::Report> {
    let err = failure(world)?;
    eyre::ensure!(
        matches!(err, TaskLifecycleError::AccessDenied { .. }),
        "expected access denial, got {err:?}"
    );
    eyre::ensure!(err.http_status() == 403, "denial must map to 403");
    Ok(())
}
