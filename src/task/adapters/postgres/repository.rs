//! `PostgreSQL` repository implementation for task lifecycle storage.

use super::{
    models::{HistoryRow, TaskRecord, TaskRow},
    schema::{task_history, tasks},
};
use crate::task::{
    domain::{
        AuditStamp, BlockReason, HistoryId, Hours, PersistedHistoryData, PersistedTaskData,
        Progress, ProjectId, Tags, Task, TaskDescription, TaskField, TaskHistory, TaskId,
        TaskPriority, TaskStatus, TaskTitle, UserId,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult, TaskWrite},
};
use async_trait::async_trait;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task, history: &[TaskHistory]) -> TaskRepositoryResult<Task> {
        let task_id = task.id();
        let record = to_record(task)?;
        let history_rows = to_history_rows(history);
        let stored = task.clone();

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|conn| {
                diesel::insert_into(tasks::table)
                    .values(&record)
                    .execute(conn)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            TaskRepositoryError::DuplicateTask(task_id)
                        }
                        _ => TaskRepositoryError::persistence(err),
                    })?;
                insert_history(conn, &history_rows)
            })?;
            Ok(stored)
        })
        .await
    }

    async fn update(&self, task: &Task, history: &[TaskHistory]) -> TaskRepositoryResult<Task> {
        let pending = PendingWrite::new(task, history)?;
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|conn| pending.execute(conn))
        })
        .await
    }

    async fn update_all(&self, batch: &[TaskWrite]) -> TaskRepositoryResult<Vec<Task>> {
        let pending = batch
            .iter()
            .map(|write| PendingWrite::new(&write.task, &write.history))
            .collect::<TaskRepositoryResult<Vec<_>>>()?;
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|conn| {
                pending
                    .iter()
                    .map(|write| write.execute(conn))
                    .collect::<TaskRepositoryResult<Vec<Task>>>()
            })
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .filter(tasks::deleted_at.is_null())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_including_deleted(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_by_project(&self, project_id: ProjectId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::project_id.eq(project_id.value()))
                .filter(tasks::deleted_at.is_null())
                .order((tasks::order_index.asc(), tasks::created_at.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn list_children(&self, parent_id: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::parent_task_id.eq(parent_id.into_inner()))
                .filter(tasks::deleted_at.is_null())
                .order((tasks::order_index.asc(), tasks::created_at.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn history_for(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<TaskHistory>> {
        self.run_blocking(move |connection| {
            let rows = history_query(task_id)
                .select(HistoryRow::as_select())
                .load::<HistoryRow>(connection)?;
            rows.into_iter().map(row_to_history).collect()
        })
        .await
    }
}

/// A versioned task update prepared for execution inside a transaction.
struct PendingWrite {
    task_id: TaskId,
    expected: u64,
    expected_db: i64,
    record: TaskRecord,
    history_rows: Vec<HistoryRow>,
    stored: Task,
}

impl PendingWrite {
    fn new(task: &Task, history: &[TaskHistory]) -> TaskRepositoryResult<Self> {
        let expected = task.version();
        let stored = Task::from_persisted(PersistedTaskData {
            version: expected.saturating_add(1),
            ..task.to_persisted()
        });
        Ok(Self {
            task_id: task.id(),
            expected,
            expected_db: to_db_version(expected)?,
            record: to_record(&stored)?,
            history_rows: to_history_rows(history),
            stored,
        })
    }

    /// Updates the row only while it is still at the loaded version.
    fn execute(&self, conn: &mut PgConnection) -> TaskRepositoryResult<Task> {
        let task_id = self.task_id;
        let updated = diesel::update(
            tasks::table
                .filter(tasks::id.eq(task_id.into_inner()))
                .filter(tasks::version.eq(self.expected_db)),
        )
        .set(&self.record)
        .execute(conn)?;

        if updated == 0 {
            let actual = tasks::table
                .filter(tasks::id.eq(task_id.into_inner()))
                .select(tasks::version)
                .first::<i64>(conn)
                .optional()?;
            return Err(match actual {
                None => TaskRepositoryError::NotFound(task_id),
                Some(version) => TaskRepositoryError::Conflict {
                    task_id,
                    expected: self.expected,
                    actual: from_db_version(version)?,
                },
            });
        }

        insert_history(conn, &self.history_rows)?;
        Ok(self.stored.clone())
    }
}

/// History of one task, oldest first. Records written by the same mutation
/// share `changed_at`, so `seq` keeps them in insertion order.
fn history_query(task_id: TaskId) -> task_history::BoxedQuery<'static, Pg> {
    task_history::table
        .filter(task_history::task_id.eq(task_id.into_inner()))
        .order((task_history::changed_at.asc(), task_history::seq.asc()))
        .into_boxed()
}

fn insert_history(
    connection: &mut PgConnection,
    rows: &[HistoryRow],
) -> TaskRepositoryResult<()> {
    if rows.is_empty() {
        return Ok(());
    }
    diesel::insert_into(task_history::table)
        .values(rows)
        .execute(connection)?;
    Ok(())
}

fn to_db_version(version: u64) -> TaskRepositoryResult<i64> {
    i64::try_from(version).map_err(TaskRepositoryError::persistence)
}

fn from_db_version(version: i64) -> TaskRepositoryResult<u64> {
    u64::try_from(version).map_err(TaskRepositoryError::persistence)
}

fn hours_to_db(hours: Option<Hours>) -> TaskRepositoryResult<Option<i32>> {
    hours
        .map(|value| i32::try_from(value.value()).map_err(TaskRepositoryError::persistence))
        .transpose()
}

fn hours_from_db(field: TaskField, hours: Option<i32>) -> TaskRepositoryResult<Option<Hours>> {
    hours
        .map(|value| Hours::new(field, i64::from(value)).map_err(TaskRepositoryError::persistence))
        .transpose()
}

fn to_record(task: &Task) -> TaskRepositoryResult<TaskRecord> {
    let audit = task.audit();
    Ok(TaskRecord {
        id: task.id().into_inner(),
        project_id: task.project_id().value(),
        title: task.title().as_str().to_owned(),
        description: task.description().map(|value| value.as_str().to_owned()),
        assignee_id: task.assignee().map(UserId::value),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        progress: task.progress().map(Progress::value),
        due_date: task.due_date(),
        start_date: task.start_date(),
        completed_at: task.completed_at(),
        estimated_hours: hours_to_db(task.estimated_hours())?,
        actual_hours: hours_to_db(task.actual_hours())?,
        tags: task.tags().map(|value| value.as_str().to_owned()),
        order_index: task.order_index(),
        is_blocked: task.is_blocked(),
        blocked_reason: task.blocked_reason().map(|value| value.as_str().to_owned()),
        parent_task_id: task.parent_id().map(TaskId::into_inner),
        created_at: audit.created_at,
        created_by: audit.created_by.value(),
        updated_at: audit.updated_at,
        updated_by: audit.updated_by.value(),
        deleted_at: audit.deleted_at,
        deleted_by: audit.deleted_by.map(UserId::value),
        version: to_db_version(task.version())?,
    })
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        project_id,
        title,
        description,
        assignee_id,
        status,
        priority,
        progress,
        due_date,
        start_date,
        completed_at,
        estimated_hours,
        actual_hours,
        tags,
        order_index,
        is_blocked,
        blocked_reason,
        parent_task_id,
        created_at,
        created_by,
        updated_at,
        updated_by,
        deleted_at,
        deleted_by,
        version,
    } = row;

    let block = if is_blocked {
        let reason = BlockReason::new(blocked_reason.unwrap_or_default())
            .map_err(TaskRepositoryError::persistence)?;
        Some(reason)
    } else {
        None
    };

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        project_id: ProjectId::new(project_id),
        title: TaskTitle::new(title).map_err(TaskRepositoryError::persistence)?,
        description: description
            .map(TaskDescription::parse)
            .transpose()
            .map_err(TaskRepositoryError::persistence)?
            .flatten(),
        assignee: assignee_id.map(UserId::new),
        status: TaskStatus::try_from(status.as_str()).map_err(TaskRepositoryError::persistence)?,
        priority: TaskPriority::try_from(priority.as_str())
            .map_err(TaskRepositoryError::persistence)?,
        progress: progress
            .map(Progress::new)
            .transpose()
            .map_err(TaskRepositoryError::persistence)?,
        due_date,
        start_date,
        completed_at,
        estimated_hours: hours_from_db(TaskField::EstimatedHours, estimated_hours)?,
        actual_hours: hours_from_db(TaskField::ActualHours, actual_hours)?,
        tags: tags
            .map(Tags::parse)
            .transpose()
            .map_err(TaskRepositoryError::persistence)?
            .flatten(),
        order_index,
        blocked_reason: block,
        parent_id: parent_task_id.map(TaskId::from_uuid),
        audit: AuditStamp {
            created_at,
            created_by: UserId::new(created_by),
            updated_at,
            updated_by: UserId::new(updated_by),
            deleted_at,
            deleted_by: deleted_by.map(UserId::new),
        },
        version: from_db_version(version)?,
    };
    Ok(Task::from_persisted(data))
}

fn to_history_rows(history: &[TaskHistory]) -> Vec<HistoryRow> {
    history
        .iter()
        .map(|record| HistoryRow {
            id: record.id().into_inner(),
            task_id: record.task_id().into_inner(),
            field_name: record.field().as_str().to_owned(),
            old_value: record.old_value().map(str::to_owned),
            new_value: record.new_value().map(str::to_owned),
            changed_by: record.actor().value(),
            changed_at: record.changed_at(),
        })
        .collect()
}

fn row_to_history(row: HistoryRow) -> TaskRepositoryResult<TaskHistory> {
    let field =
        TaskField::try_from(row.field_name.as_str()).map_err(TaskRepositoryError::persistence)?;
    Ok(TaskHistory::from_persisted(PersistedHistoryData {
        id: HistoryId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        field,
        old_value: row.old_value,
        new_value: row.new_value,
        actor: UserId::new(row.changed_by),
        changed_at: row.changed_at,
    }))
}

#[cfg(test)]
mod tests {
    //! Row conversion and query-shape tests; they need no database.

    use super::{history_query, row_to_history, row_to_task, to_history_rows, to_record};
    use crate::task::domain::{NewTask, ProjectId, Task, TaskField, TaskHistory, TaskId, UserId};
    use crate::task::adapters::postgres::models::TaskRow;
    use crate::task::ports::TaskRepositoryError;
    use diesel::pg::Pg;
    use mockable::DefaultClock;
    use rstest::rstest;

    fn record_to_row(task: &Task) -> TaskRow {
        let record = to_record(task).expect("task converts to a record");
        TaskRow {
            id: record.id,
            project_id: record.project_id,
            title: record.title,
            description: record.description,
            assignee_id: record.assignee_id,
            status: record.status,
            priority: record.priority,
            progress: record.progress,
            due_date: record.due_date,
            start_date: record.start_date,
            completed_at: record.completed_at,
            estimated_hours: record.estimated_hours,
            actual_hours: record.actual_hours,
            tags: record.tags,
            order_index: record.order_index,
            is_blocked: record.is_blocked,
            blocked_reason: record.blocked_reason,
            parent_task_id: record.parent_task_id,
            created_at: record.created_at,
            created_by: record.created_by,
            updated_at: record.updated_at,
            updated_by: record.updated_by,
            deleted_at: record.deleted_at,
            deleted_by: record.deleted_by,
            version: record.version,
        }
    }

    fn sample_task() -> Task {
        let clock = DefaultClock;
        let (mut task, _) = Task::create(
            NewTask::new("Persist me", ProjectId::new(3))
                .with_description("Stored in Postgres")
                .with_estimated_hours(8)
                .with_tags("db"),
            UserId::new(1),
            &clock,
        )
        .expect("valid task");
        task.block("waiting on schema review", UserId::new(1), &clock)
            .expect("block succeeds");
        task.update_progress(
            42.5,
            crate::task::domain::ProgressCompletion::Forced,
            UserId::new(2),
            &clock,
        )
        .expect("progress succeeds");
        task
    }

    #[rstest]
    fn task_survives_record_conversion() {
        let task = sample_task();
        let restored = row_to_task(record_to_row(&task)).expect("row converts back");
        assert_eq!(restored, task);
    }

    #[rstest]
    fn blocked_row_without_reason_is_rejected() {
        let mut row = record_to_row(&sample_task());
        row.blocked_reason = None;
        let result = row_to_task(row);
        assert!(matches!(result, Err(TaskRepositoryError::Persistence(_))));
    }

    #[rstest]
    fn unknown_status_is_rejected() {
        let mut row = record_to_row(&sample_task());
        row.status = "on_hold".to_owned();
        assert!(row_to_task(row).is_err());
    }

    #[rstest]
    fn history_rows_keep_field_names() {
        let task = sample_task();
        let record = TaskHistory::new(
            task.id(),
            TaskField::EstimatedHours,
            Some("8".to_owned()),
            None,
            UserId::new(4),
            task.updated_at(),
        );
        let rows = to_history_rows(std::slice::from_ref(&record));
        assert_eq!(
            rows.first().map(|row| row.field_name.as_str()),
            Some("EstimatedHours")
        );

        let restored: Vec<TaskHistory> = rows
            .into_iter()
            .map(row_to_history)
            .collect::<Result<_, _>>()
            .expect("rows convert back");
        assert_eq!(restored, vec![record]);
    }

    #[rstest]
    fn history_query_breaks_timestamp_ties_by_insertion_order() {
        let sql = diesel::debug_query::<Pg, _>(&history_query(TaskId::new())).to_string();
        assert!(
            sql.contains(r#"ORDER BY "task_history"."changed_at" ASC, "task_history"."seq" ASC"#),
            "unexpected history query: {sql}"
        );
    }
}
