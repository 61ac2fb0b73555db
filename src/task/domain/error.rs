//! Error types for task domain validation and order computation.

use super::TaskId;
use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyTaskName,

    /// The task name is longer than the stored column allows.
    #[error("task name must be at most {max} characters")]
    TaskNameTooLong {
        /// Longest accepted name.
        max: usize,
    },

    /// The list name is empty after trimming.
    #[error("list name must not be empty")]
    EmptyListName,

    /// The list name is longer than the stored column allows.
    #[error("list name must be at most {max} characters")]
    ListNameTooLong {
        /// Longest accepted name.
        max: usize,
    },

    /// A sequence position does not fit the persisted order column.
    #[error("order index {0} exceeds the supported range")]
    OrderOutOfRange(usize),
}

/// Errors returned by the order engine when an operation cannot be applied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderError {
    /// A move referenced a task that is not part of the sequence.
    #[error("task {0} is not part of the list")]
    UnknownTask(TaskId),

    /// An explicit arrangement mentioned the same task twice.
    #[error("task {0} appears more than once in the requested order")]
    DuplicateTask(TaskId),

    /// An explicit arrangement mentioned tasks that are not list members.
    #[error("requested order references {} task(s) outside the list", .0.len())]
    ForeignTasks(Vec<TaskId>),
}
