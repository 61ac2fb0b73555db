//! `PostgreSQL` store implementation for lists and ordered tasks.

use super::{
    conversions::{
        order_to_column, row_to_list, row_to_task, to_fields_changeset, to_new_list_row,
        to_new_task_row, version_from_column, version_to_column,
    },
    models::{ListRow, TaskRow},
    schema::{task_lists, tasks},
};
use crate::task::{
    domain::{ListId, ListName, ListVersion, Task, TaskId, TaskList, UserId},
    ports::{
        ListCommit, ListRepository, TaskRepository, TaskRepositoryError, TaskRepositoryResult,
    },
};
use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::HashSet;
use tracing::debug;

/// `PostgreSQL` connection pool type used by the task store.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// Schema applied by [`PostgresTaskStore::apply_schema`].
const SCHEMA_SQL: &str =
    include_str!("../../../../migrations/2025-06-01-000000_create_task_lists/up.sql");

/// Builds a connection pool for `database_url`.
///
/// # Errors
///
/// Returns [`TaskRepositoryError::Persistence`] when the pool cannot be
/// created.
pub fn connect_pool(database_url: &str, max_size: u32) -> TaskRepositoryResult<TaskPgPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(TaskRepositoryError::persistence)
}

/// `PostgreSQL`-backed store implementing both repository ports.
///
/// Structural writes run in a transaction that locks the list row, so a
/// [`ListCommit`] either lands completely or leaves the prior order intact.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: TaskPgPool,
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

impl PostgresTaskStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    /// Creates the list and task tables when they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the schema cannot be
    /// applied.
    pub async fn apply_schema(&self) -> TaskRepositoryResult<()> {
        self.run_blocking(|connection| {
            connection
                .batch_execute(SCHEMA_SQL)
                .map_err(TaskRepositoryError::persistence)
        })
        .await
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

/// Locks the list row and checks the observed version.
fn lock_list_version(
    connection: &mut PgConnection,
    list_id: ListId,
    expected: ListVersion,
) -> TaskRepositoryResult<()> {
    let stored = task_lists::table
        .find(list_id.into_inner())
        .select(task_lists::version)
        .for_update()
        .first::<i64>(connection)
        .optional()?
        .ok_or(TaskRepositoryError::ListNotFound(list_id))?;

    let actual = version_from_column(stored)?;
    if actual != expected {
        return Err(TaskRepositoryError::VersionConflict {
            list_id,
            expected,
            actual,
        });
    }
    Ok(())
}

fn write_version(
    connection: &mut PgConnection,
    list_id: ListId,
    version: ListVersion,
) -> TaskRepositoryResult<()> {
    diesel::update(task_lists::table.find(list_id.into_inner()))
        .set(task_lists::version.eq(version_to_column(version)?))
        .execute(connection)?;
    Ok(())
}

fn apply_commit(
    connection: &mut PgConnection,
    commit: &ListCommit,
) -> TaskRepositoryResult<ListVersion> {
    lock_list_version(connection, commit.list_id, commit.expected_version)?;

    let members: HashSet<TaskId> = tasks::table
        .filter(tasks::list_id.eq(commit.list_id.into_inner()))
        .select(tasks::id)
        .load::<uuid::Uuid>(connection)?
        .into_iter()
        .map(TaskId::from_uuid)
        .collect();
    commit.validate_against(&members)?;

    if !commit.removed.is_empty() {
        let removed: Vec<uuid::Uuid> = commit.removed.iter().map(|id| id.into_inner()).collect();
        diesel::delete(tasks::table.filter(tasks::id.eq_any(removed))).execute(connection)?;
    }

    // The (list_id, position) constraint is deferred to commit time, so rows
    // may collide transiently while they are rewritten one by one.
    for assignment in &commit.assignments {
        diesel::update(tasks::table.find(assignment.task_id.into_inner()))
            .set(tasks::position.eq(order_to_column(assignment.order)?))
            .execute(connection)?;
    }

    let version = commit.expected_version.next();
    write_version(connection, commit.list_id, version)?;
    Ok(version)
}

#[async_trait]
impl ListRepository for PostgresTaskStore {
    async fn store(&self, list: &TaskList) -> TaskRepositoryResult<()> {
        let list_id = list.id();
        let new_row = to_new_list_row(list)?;
        self.run_blocking(move |connection| {
            diesel::insert_into(task_lists::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateList(list_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: ListId) -> TaskRepositoryResult<Option<TaskList>> {
        self.run_blocking(move |connection| {
            let row = task_lists::table
                .find(id.into_inner())
                .select(ListRow::as_select())
                .first::<ListRow>(connection)
                .optional()?;
            row.map(row_to_list).transpose()
        })
        .await
    }

    async fn find_by_owner(&self, owner: UserId) -> TaskRepositoryResult<Vec<TaskList>> {
        self.run_blocking(move |connection| {
            task_lists::table
                .filter(task_lists::owner_id.eq(owner.into_inner()))
                .order((task_lists::created_at.asc(), task_lists::id.asc()))
                .select(ListRow::as_select())
                .load::<ListRow>(connection)?
                .into_iter()
                .map(row_to_list)
                .collect()
        })
        .await
    }

    async fn list_ids(&self) -> TaskRepositoryResult<Vec<ListId>> {
        self.run_blocking(|connection| {
            let ids = task_lists::table
                .select(task_lists::id)
                .order(task_lists::id.asc())
                .load::<uuid::Uuid>(connection)?;
            Ok(ids.into_iter().map(ListId::from_uuid).collect())
        })
        .await
    }

    async fn rename(&self, id: ListId, name: &ListName) -> TaskRepositoryResult<TaskList> {
        let new_name = name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = diesel::update(task_lists::table.find(id.into_inner()))
                .set(task_lists::name.eq(new_name))
                .returning(ListRow::as_returning())
                .get_result::<ListRow>(connection)
                .optional()?
                .ok_or(TaskRepositoryError::ListNotFound(id))?;
            row_to_list(row)
        })
        .await
    }

    async fn delete(&self, id: ListId) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            // Tasks go with the list through ON DELETE CASCADE.
            let deleted =
                diesel::delete(task_lists::table.find(id.into_inner())).execute(connection)?;
            if deleted == 0 {
                return Err(TaskRepositoryError::ListNotFound(id));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskStore {
    async fn insert(
        &self,
        task: &Task,
        expected_version: ListVersion,
    ) -> TaskRepositoryResult<ListVersion> {
        let task_id = task.id();
        let list_id = task.list_id();
        let new_row = to_new_task_row(task)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                lock_list_version(tx, list_id, expected_version)?;
                diesel::insert_into(tasks::table)
                    .values(&new_row)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            TaskRepositoryError::DuplicateTask(task_id)
                        }
                        _ => TaskRepositoryError::persistence(err),
                    })?;
                let version = expected_version.next();
                write_version(tx, list_id, version)?;
                Ok(version)
            })
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let changes = to_fields_changeset(task);
        self.run_blocking(move |connection| {
            let updated = diesel::update(tasks::table.find(task_id.into_inner()))
                .set(&changes)
                .execute(connection)?;
            if updated == 0 {
                return Err(TaskRepositoryError::TaskNotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn load_list(&self, list_id: ListId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            tasks::table
                .filter(tasks::list_id.eq(list_id.into_inner()))
                .order((
                    tasks::position.asc(),
                    tasks::created_at.asc(),
                    tasks::id.asc(),
                ))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?
                .into_iter()
                .map(row_to_task)
                .collect()
        })
        .await
    }

    async fn commit(&self, commit: &ListCommit) -> TaskRepositoryResult<ListVersion> {
        let commit = commit.clone();
        let version = self
            .run_blocking(move |connection| {
                connection.transaction::<_, TaskRepositoryError, _>(|tx| apply_commit(tx, &commit))
            })
            .await?;
        debug!(%version, "list commit applied");
        Ok(version)
    }
}
