//! JSON request and response bodies of the task API.

use crate::task::{
    domain::{ListId, Task, TaskId, TaskList},
    services::ListSnapshot,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A task as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskBody {
    /// Task identifier.
    pub id: TaskId,
    /// Task name.
    pub name: String,
    /// Completion flag.
    pub completed: bool,
    /// Due timestamp, if any.
    #[serde(rename = "dueDateTimeISO")]
    pub due_date_time_iso: Option<DateTime<Utc>>,
    /// Owning list.
    pub list: ListId,
    /// Position within the list.
    pub order: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Task> for TaskBody {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id(),
            name: task.name().as_str().to_owned(),
            completed: task.completed(),
            due_date_time_iso: task.due_at(),
            list: task.list_id(),
            order: task.order().value(),
            created_at: task.created_at(),
        }
    }
}

/// A list's ordered tasks together with the version they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotBody {
    /// List identifier.
    pub list: ListId,
    /// Sequence version; send it back as `expectedVersion` to pin a write.
    pub version: u64,
    /// Tasks in order.
    pub tasks: Vec<TaskBody>,
}

impl From<&ListSnapshot> for SnapshotBody {
    fn from(snapshot: &ListSnapshot) -> Self {
        Self {
            list: snapshot.list_id,
            version: snapshot.version.value(),
            tasks: snapshot.tasks.iter().map(TaskBody::from).collect(),
        }
    }
}

/// A list as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBody {
    /// List identifier.
    pub id: ListId,
    /// List name.
    pub name: String,
    /// Sequence version.
    pub version: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&TaskList> for ListBody {
    fn from(list: &TaskList) -> Self {
        Self {
            id: list.id(),
            name: list.name().as_str().to_owned(),
            version: list.version().value(),
            created_at: list.created_at(),
        }
    }
}

/// `?list=<id>` query parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    /// Target list.
    pub list: ListId,
}

/// Body of `POST /api/tasks`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskBody {
    /// Client-generated identifier, if any.
    #[serde(default)]
    pub id: Option<TaskId>,
    /// Task name.
    pub name: String,
    /// Target list.
    pub list: ListId,
    /// Initial completion flag.
    #[serde(default)]
    pub completed: bool,
    /// Due timestamp, if any.
    #[serde(default, rename = "dueDateTimeISO")]
    pub due_date_time_iso: Option<DateTime<Utc>>,
}

/// Body of `PUT /api/tasks/{id}`.
///
/// An absent field is left unchanged; `"dueDateTimeISO": null` clears the
/// due date.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskBody {
    /// New name.
    #[serde(default)]
    pub name: Option<String>,
    /// New completion flag.
    #[serde(default)]
    pub completed: Option<bool>,
    /// New due timestamp, or `Some(None)` to clear it.
    #[serde(default, rename = "dueDateTimeISO", deserialize_with = "present")]
    pub due_date_time_iso: Option<Option<DateTime<Utc>>>,
}

/// Body of `PUT /api/tasks/reorder`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderBody {
    /// Target list.
    pub list: ListId,
    /// Requested order.
    pub ordered_task_ids: Vec<TaskId>,
    /// Version the order was computed against.
    #[serde(default)]
    pub expected_version: Option<u64>,
}

/// Body of `POST /api/tasks/sort`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortBody {
    /// Target list.
    pub list: ListId,
    /// Version the request was based on.
    #[serde(default)]
    pub expected_version: Option<u64>,
}

/// Body of `POST /api/tasks/move`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveBody {
    /// Target list.
    pub list: ListId,
    /// Task being moved.
    pub moved_id: TaskId,
    /// Task whose slot the moved task takes; absent moves to the end.
    #[serde(default)]
    pub target_id: Option<TaskId>,
    /// Version the move was computed against.
    #[serde(default)]
    pub expected_version: Option<u64>,
}

/// Body of `POST /api/lists` and `PUT /api/lists/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListNameBody {
    /// List name.
    pub name: String,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
