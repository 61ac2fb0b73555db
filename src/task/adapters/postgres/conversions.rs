//! Conversions between Diesel rows and domain values.

use super::models::{ListRow, NewListRow, NewTaskRow, TaskFieldsChangeset, TaskRow};
use crate::task::{
    domain::{
        ListId, ListName, ListVersion, PersistedTaskData, Task, TaskId, TaskList, TaskName,
        TaskOrder, UserId,
    },
    ports::{TaskRepositoryError, TaskRepositoryResult},
};

pub(super) fn order_to_column(order: TaskOrder) -> TaskRepositoryResult<i32> {
    i32::try_from(order.value()).map_err(TaskRepositoryError::persistence)
}

pub(super) fn version_to_column(version: ListVersion) -> TaskRepositoryResult<i64> {
    i64::try_from(version.value()).map_err(TaskRepositoryError::persistence)
}

pub(super) fn version_from_column(version: i64) -> TaskRepositoryResult<ListVersion> {
    u64::try_from(version)
        .map(ListVersion::new)
        .map_err(TaskRepositoryError::persistence)
}

pub(super) fn to_new_task_row(task: &Task) -> TaskRepositoryResult<NewTaskRow> {
    Ok(NewTaskRow {
        id: task.id().into_inner(),
        list_id: task.list_id().into_inner(),
        name: task.name().as_str().to_owned(),
        completed: task.completed(),
        due_at: task.due_at(),
        position: order_to_column(task.order())?,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

pub(super) fn to_fields_changeset(task: &Task) -> TaskFieldsChangeset {
    TaskFieldsChangeset {
        name: task.name().as_str().to_owned(),
        completed: task.completed(),
        due_at: task.due_at(),
        updated_at: task.updated_at(),
    }
}

pub(super) fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        list_id,
        name,
        completed,
        due_at,
        position,
        created_at,
        updated_at,
    } = row;

    let task_name = TaskName::new(name).map_err(TaskRepositoryError::persistence)?;
    let order = u32::try_from(position)
        .map(TaskOrder::new)
        .map_err(TaskRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        list_id: ListId::from_uuid(list_id),
        name: task_name,
        completed,
        due_at,
        order,
        created_at,
        updated_at,
    }))
}

pub(super) fn to_new_list_row(list: &TaskList) -> TaskRepositoryResult<NewListRow> {
    Ok(NewListRow {
        id: list.id().into_inner(),
        owner_id: list.owner().into_inner(),
        name: list.name().as_str().to_owned(),
        version: version_to_column(list.version())?,
        created_at: list.created_at(),
    })
}

pub(super) fn row_to_list(row: ListRow) -> TaskRepositoryResult<TaskList> {
    let name = ListName::new(row.name).map_err(TaskRepositoryError::persistence)?;
    Ok(TaskList::from_persisted(
        ListId::from_uuid(row.id),
        UserId::from_uuid(row.owner_id),
        name,
        version_from_column(row.version)?,
        row.created_at,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use uuid::Uuid;

    fn task_row(name: &str, position: i32) -> TaskRow {
        let timestamp = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).single().expect("timestamp");
        TaskRow {
            id: Uuid::new_v4(),
            list_id: Uuid::new_v4(),
            name: name.to_owned(),
            completed: false,
            due_at: Some(timestamp),
            position,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    #[rstest]
    fn task_row_round_trips_through_domain() {
        let row = task_row("Water plants", 4);
        let task = row_to_task(row.clone()).expect("valid row");

        assert_eq!(task.order(), TaskOrder::new(4));
        assert_eq!(task.name().as_str(), "Water plants");

        let new_row = to_new_task_row(&task).expect("convertible task");
        assert_eq!(new_row.id, row.id);
        assert_eq!(new_row.list_id, row.list_id);
        assert_eq!(new_row.position, 4);
        assert_eq!(new_row.due_at, row.due_at);
    }

    #[rstest]
    fn negative_position_is_a_persistence_error() {
        let result = row_to_task(task_row("Broken", -1));
        assert!(matches!(result, Err(TaskRepositoryError::Persistence(_))));
    }

    #[rstest]
    fn blank_name_is_a_persistence_error() {
        let result = row_to_task(task_row("   ", 0));
        assert!(matches!(result, Err(TaskRepositoryError::Persistence(_))));
    }

    #[rstest]
    #[case(0)]
    #[case(17)]
    fn list_version_round_trips(#[case] raw: i64) {
        let version = version_from_column(raw).expect("non-negative version");
        assert_eq!(version_to_column(version).expect("fits column"), raw);
    }

    #[rstest]
    fn negative_list_version_is_rejected() {
        assert!(version_from_column(-3).is_err());
    }
}
