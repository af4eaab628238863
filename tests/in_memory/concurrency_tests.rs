//! Optimistic concurrency tests against the in-memory repository.

use std::sync::Arc;

use super::helpers::{OWNER, PROJECT, TestService, service};
use mockable::DefaultClock;
use rstest::rstest;
use tasklane::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::NewTask,
    ports::{TaskRepository, TaskRepositoryError},
    services::{CreateTaskRequest, TaskLifecycleError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_writer_gets_conflict_and_can_retry(
    service: (TestService, Arc<InMemoryTaskRepository>),
) -> Result<(), eyre::Report> {
    let (service, repo) = service;
    let task = service
        .create_task(CreateTaskRequest::new(NewTask::new("Shared", PROJECT)), OWNER)
        .await?
        .task;

    let mut stale = repo
        .find_by_id(task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task should exist"))?;
    service.rename(task.id(), "Fresh title", OWNER).await?;

    let change = stale.rename("Stale title", OWNER, &DefaultClock)?;
    let result = repo.update(&stale, &change.history).await;
    let Err(err) = result else {
        return Err(eyre::eyre!("stale write should conflict"));
    };
    eyre::ensure!(matches!(
        err,
        TaskRepositoryError::Conflict {
            expected: 0,
            actual: 1,
            ..
        }
    ));
    eyre::ensure!(TaskLifecycleError::from(err).http_status() == 409);

    let retried = service.rename(task.id(), "Stale title", OWNER).await?;
    eyre::ensure!(retried.task.title().as_str() == "Stale title");
    eyre::ensure!(retried.task.version() == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn parallel_updates_each_commit_once(
    service: (TestService, Arc<InMemoryTaskRepository>),
) -> Result<(), eyre::Report> {
    let (service, _) = service;
    let service = Arc::new(service);
    let task = service
        .create_task(CreateTaskRequest::new(NewTask::new("Busy", PROJECT)), OWNER)
        .await?
        .task;

    let mut handles = Vec::new();
    for order_index in 1..=8 {
        let worker = Arc::clone(&service);
        let id = task.id();
        handles.push(tokio::spawn(async move {
            worker.set_order_index(id, order_index, OWNER).await
        }));
    }

    let mut committed = 0_u64;
    for handle in handles {
        match handle.await? {
            Ok(_) => committed += 1,
            Err(TaskLifecycleError::Repository(TaskRepositoryError::Conflict { .. })) => {}
            Err(other) => return Err(other.into()),
        }
    }

    let stored = service.get_task(task.id(), OWNER).await?;
    eyre::ensure!(stored.version() == committed);
    let recorded = u64::try_from(service.task_history(task.id(), OWNER).await?.len())?;
    eyre::ensure!(recorded == committed);
    Ok(())
}
