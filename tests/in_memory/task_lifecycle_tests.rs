//! In-memory integration tests for task lifecycle operations.

use std::sync::Arc;

use super::helpers::{MEMBER, OWNER, PROJECT, TestService, service};
use chrono::{Duration, Utc};
use rstest::rstest;
use tasklane::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{NewTask, TaskEvent, TaskField, TaskPriority, TaskStatus, TaskUpdate, UNASSIGNED},
    ports::TaskRepository,
    services::CreateTaskRequest,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_lifecycle_is_audited(
    service: (TestService, Arc<InMemoryTaskRepository>),
) -> Result<(), eyre::Report> {
    let (service, _) = service;
    let created = service
        .create_task(
            CreateTaskRequest::new(
                NewTask::new("Implement auth", PROJECT).with_priority(TaskPriority::High),
            ),
            OWNER,
        )
        .await?;
    let id = created.task.id();

    service.assign(id, Some(MEMBER), OWNER).await?;
    service
        .change_status(id, TaskStatus::InProgress, MEMBER)
        .await?;
    service.update_progress(id, 60.0, MEMBER).await?;
    service.change_status(id, TaskStatus::InReview, MEMBER).await?;
    let done = service.change_status(id, TaskStatus::Done, OWNER).await?;
    let archived = service.change_status(id, TaskStatus::Archived, OWNER).await?;

    eyre::ensure!(done.task.completed_at().is_some());
    eyre::ensure!(archived.task.status() == TaskStatus::Archived);
    eyre::ensure!(archived.task.completed_at().is_none());
    eyre::ensure!(archived.task.version() == 6, "six committed mutations");

    let history = service.task_history(id, MEMBER).await?;
    let fields: Vec<TaskField> = history.iter().map(|record| record.field()).collect();
    eyre::ensure!(
        fields
            == vec![
                TaskField::Assignee,
                TaskField::Status,
                TaskField::Progress,
                TaskField::Status,
                TaskField::Status,
                TaskField::Progress,
                TaskField::Status,
            ],
        "unexpected history: {fields:?}"
    );
    let first = history
        .first()
        .ok_or_else(|| eyre::eyre!("history should not be empty"))?;
    eyre::ensure!(first.old_value() == Some(UNASSIGNED));
    eyre::ensure!(first.new_value() == Some("2"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn batch_update_writes_one_record_per_field(
    service: (TestService, Arc<InMemoryTaskRepository>),
) -> Result<(), eyre::Report> {
    let (service, repo) = service;
    let task = service
        .create_task(CreateTaskRequest::new(NewTask::new("Batch", PROJECT)), OWNER)
        .await?
        .task;

    let update = TaskUpdate::new()
        .with_title("Batch edited")
        .with_due_date(Some(Utc::now() + Duration::days(2)))
        .with_start_date(Some(Utc::now()))
        .with_order_index(9)
        .with_status(TaskStatus::InProgress)
        .with_progress(100.0);
    let mutation = service.update_task(task.id(), update, MEMBER).await?;

    eyre::ensure!(mutation.task.status() == TaskStatus::Done);
    eyre::ensure!(
        mutation.changed_fields()
            == vec![
                TaskField::Title,
                TaskField::Status,
                TaskField::Progress,
                TaskField::DueDate,
                TaskField::StartDate,
                TaskField::OrderIndex,
            ]
    );
    eyre::ensure!(matches!(
        mutation.events.as_slice(),
        [
            TaskEvent::StatusChanged { to: TaskStatus::InProgress, .. },
            TaskEvent::StatusChanged { to: TaskStatus::Done, .. },
            TaskEvent::Completed { forced: true, .. },
        ]
    ));
    eyre::ensure!(repo.history_for(task.id()).await?.len() == 6);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_listing_follows_manual_order(
    service: (TestService, Arc<InMemoryTaskRepository>),
) -> Result<(), eyre::Report> {
    let (service, _) = service;
    let mut ids = Vec::new();
    for (title, order_index) in [("Third", 3), ("First", 1), ("Second", 2)] {
        let mutation = service
            .create_task(
                CreateTaskRequest::new(NewTask::new(title, PROJECT).with_order_index(order_index)),
                OWNER,
            )
            .await?;
        ids.push((order_index, mutation.task.id()));
    }
    ids.sort_by_key(|(order_index, _)| *order_index);

    let listed: Vec<_> = service
        .list_project_tasks(PROJECT, MEMBER)
        .await?
        .iter()
        .map(|task| task.id())
        .collect();
    let expected: Vec<_> = ids.into_iter().map(|(_, id)| id).collect();
    eyre::ensure!(listed == expected);
    Ok(())
}
