//! Request, response and policy types for [`super::TaskOrderService`].

use crate::task::domain::{ListId, ListVersion, OrderOperation, Task, TaskId};
use chrono::{DateTime, Utc};
use std::str::FromStr;
use thiserror::Error;

/// How an explicit arrangement treats ids that are not list members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ForeignIdPolicy {
    /// Reject the whole request.
    #[default]
    Reject,
    /// Drop foreign ids and repeated occurrences, keep the rest.
    Ignore,
}

/// Error returned when parsing an unknown [`ForeignIdPolicy`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown foreign id policy `{0}`; expected `reject` or `ignore`")]
pub struct ParseForeignIdPolicyError(String);

impl FromStr for ForeignIdPolicy {
    type Err = ParseForeignIdPolicyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "ignore" => Ok(Self::Ignore),
            _ => Err(ParseForeignIdPolicyError(value.to_owned())),
        }
    }
}

/// Tunables of the reorder protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderPolicy {
    foreign_ids: ForeignIdPolicy,
    commit_attempts: u32,
}

impl ReorderPolicy {
    /// Number of commit attempts made when no version is pinned.
    pub const DEFAULT_COMMIT_ATTEMPTS: u32 = 3;

    /// Sets the foreign id policy.
    #[must_use]
    pub const fn with_foreign_ids(mut self, policy: ForeignIdPolicy) -> Self {
        self.foreign_ids = policy;
        self
    }

    /// Sets how many times a contended commit is attempted. Zero is treated
    /// as one.
    #[must_use]
    pub const fn with_commit_attempts(mut self, attempts: u32) -> Self {
        self.commit_attempts = attempts;
        self
    }

    /// Returns the foreign id policy.
    #[must_use]
    pub const fn foreign_ids(&self) -> ForeignIdPolicy {
        self.foreign_ids
    }

    /// Returns the effective number of commit attempts.
    #[must_use]
    pub const fn commit_attempts(&self) -> u32 {
        if self.commit_attempts == 0 {
            1
        } else {
            self.commit_attempts
        }
    }
}

impl Default for ReorderPolicy {
    fn default() -> Self {
        Self {
            foreign_ids: ForeignIdPolicy::default(),
            commit_attempts: Self::DEFAULT_COMMIT_ATTEMPTS,
        }
    }
}

/// Request payload for appending a task to a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    pub(super) list_id: ListId,
    pub(super) id: Option<TaskId>,
    pub(super) name: String,
    pub(super) completed: bool,
    pub(super) due_at: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    /// Creates a request for an incomplete task without a due date.
    #[must_use]
    pub fn new(list_id: ListId, name: impl Into<String>) -> Self {
        Self {
            list_id,
            id: None,
            name: name.into(),
            completed: false,
            due_at: None,
        }
    }

    /// Uses a caller-generated identifier, as optimistic clients do.
    #[must_use]
    pub const fn with_id(mut self, id: TaskId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the initial completion flag.
    #[must_use]
    pub const fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Sets the due timestamp.
    #[must_use]
    pub const fn with_due_at(mut self, due_at: DateTime<Utc>) -> Self {
        self.due_at = Some(due_at);
        self
    }

    /// Returns the target list.
    #[must_use]
    pub const fn list_id(&self) -> ListId {
        self.list_id
    }
}

/// Field edits applied to an existing task. Order is never touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    pub(super) name: Option<String>,
    pub(super) completed: Option<bool>,
    pub(super) due_at: Option<Option<DateTime<Utc>>>,
}

impl UpdateTaskRequest {
    /// Creates an empty edit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renames the task.
    #[must_use]
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the completion flag.
    #[must_use]
    pub const fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Sets the due timestamp, or clears it with `None`.
    #[must_use]
    pub const fn due_at(mut self, due_at: Option<DateTime<Utc>>) -> Self {
        self.due_at = Some(due_at);
        self
    }

    /// Returns whether the edit changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.completed.is_none() && self.due_at.is_none()
    }
}

/// A structural change to a list's sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderRequest {
    pub(super) operation: OrderOperation,
    pub(super) expected_version: Option<ListVersion>,
}

impl ReorderRequest {
    /// Creates a last-write-wins request.
    #[must_use]
    pub const fn new(operation: OrderOperation) -> Self {
        Self {
            operation,
            expected_version: None,
        }
    }

    /// Pins the version the caller computed the request against; the request
    /// fails instead of retrying when the list has moved on.
    #[must_use]
    pub const fn expecting_version(mut self, version: ListVersion) -> Self {
        self.expected_version = Some(version);
        self
    }

    /// Returns the requested operation.
    #[must_use]
    pub const fn operation(&self) -> &OrderOperation {
        &self.operation
    }
}

/// Canonical view of a list after a read or a committed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSnapshot {
    /// List the tasks belong to.
    pub list_id: ListId,
    /// Version of the sequence.
    pub version: ListVersion,
    /// Tasks in order; `tasks[i].order() == i`.
    pub tasks: Vec<Task>,
}

impl ListSnapshot {
    /// Returns the task identifiers in order.
    #[must_use]
    pub fn ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(Task::id).collect()
    }

    /// Finds a task by identifier.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    /// Returns the number of tasks.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns whether the list is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// A newly appended task together with the list version it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTask {
    /// The stored task.
    pub task: Task,
    /// List version after the append.
    pub version: ListVersion,
}
