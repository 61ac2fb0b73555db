//! Task record and the summary view consumed by the order engine.

use super::{ListId, TaskId, TaskName, TaskOrder};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A single entry of a task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    list_id: ListId,
    name: TaskName,
    completed: bool,
    due_at: Option<DateTime<Utc>>,
    order: TaskOrder,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owning list.
    pub list_id: ListId,
    /// Persisted name.
    pub name: TaskName,
    /// Persisted completion flag.
    pub completed: bool,
    /// Persisted due timestamp, if any.
    pub due_at: Option<DateTime<Utc>>,
    /// Persisted position within the list.
    pub order: TaskOrder,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Attributes of a task about to be appended to a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Identifier to assign; callers may pre-generate it for optimistic use.
    pub id: TaskId,
    /// Owning list.
    pub list_id: ListId,
    /// Task name.
    pub name: TaskName,
    /// Initial completion flag.
    pub completed: bool,
    /// Optional due timestamp.
    pub due_at: Option<DateTime<Utc>>,
}

/// Order-relevant projection of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSummary {
    /// Task identifier.
    pub id: TaskId,
    /// Whether the task is completed.
    pub completed: bool,
    /// Due timestamp, if any.
    pub due_at: Option<DateTime<Utc>>,
}

impl TaskSummary {
    /// Creates a summary for a task without a due date.
    #[must_use]
    pub const fn new(id: TaskId, completed: bool) -> Self {
        Self {
            id,
            completed,
            due_at: None,
        }
    }

    /// Sets the due timestamp.
    #[must_use]
    pub const fn with_due_at(mut self, due_at: DateTime<Utc>) -> Self {
        self.due_at = Some(due_at);
        self
    }
}

impl Task {
    /// Creates a task at the given position.
    #[must_use]
    pub fn new(new_task: NewTask, order: TaskOrder, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: new_task.id,
            list_id: new_task.list_id,
            name: new_task.name,
            completed: new_task.completed,
            due_at: new_task.due_at,
            order,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            list_id: data.list_id,
            name: data.name,
            completed: data.completed,
            due_at: data.due_at,
            order: data.order,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning list.
    #[must_use]
    pub const fn list_id(&self) -> ListId {
        self.list_id
    }

    /// Returns the task name.
    #[must_use]
    pub const fn name(&self) -> &TaskName {
        &self.name
    }

    /// Returns whether the task is completed.
    #[must_use]
    pub const fn completed(&self) -> bool {
        self.completed
    }

    /// Returns the due timestamp, if any.
    #[must_use]
    pub const fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_at
    }

    /// Returns the position within the list.
    #[must_use]
    pub const fn order(&self) -> TaskOrder {
        self.order
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the order-relevant projection of this task.
    #[must_use]
    pub const fn summary(&self) -> TaskSummary {
        TaskSummary {
            id: self.id,
            completed: self.completed,
            due_at: self.due_at,
        }
    }

    /// Renames the task.
    pub fn rename(&mut self, name: TaskName, clock: &impl Clock) {
        self.name = name;
        self.touch(clock);
    }

    /// Sets the completion flag.
    pub fn set_completed(&mut self, completed: bool, clock: &impl Clock) {
        self.completed = completed;
        self.touch(clock);
    }

    /// Sets or clears the due timestamp.
    pub fn set_due_at(&mut self, due_at: Option<DateTime<Utc>>, clock: &impl Clock) {
        self.due_at = due_at;
        self.touch(clock);
    }

    /// Moves the task to a new position.
    ///
    /// Only order renumbering calls this; field edits never change order.
    pub const fn reposition(&mut self, order: TaskOrder) {
        self.order = order;
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
