//! Service-level errors and their coarse classification.

use crate::task::{
    domain::{ListId, ListVersion, OrderError, TaskDomainError, TaskId, UserId},
    ports::TaskRepositoryError,
};
use thiserror::Error;

/// Coarse outcome class used by adapters to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The caller does not own the list.
    Authorization,
    /// The list or task does not exist.
    NotFound,
    /// The request was malformed.
    Validation,
    /// The request raced another writer or referenced vanished state.
    Conflict,
    /// Storage failed.
    Internal,
}

/// Errors returned by [`super::TaskOrderService`].
#[derive(Debug, Error)]
pub enum TaskOrderError {
    /// The list belongs to another user.
    #[error("list {list_id} is not accessible to user {caller}")]
    AccessDenied {
        /// Requested list.
        list_id: ListId,
        /// Authenticated caller.
        caller: UserId,
    },

    /// The list does not exist.
    #[error("list not found: {0}")]
    ListNotFound(ListId),

    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The requested order is not a valid selection of list members.
    #[error(transparent)]
    Validation(OrderError),

    /// A value failed domain validation.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// A move referenced a task that is no longer in the list.
    #[error("task {0} is not in the list; reload and retry")]
    UnknownMoveTarget(TaskId),

    /// A client-supplied identifier is already in use.
    #[error("task identifier already in use: {0}")]
    DuplicateTask(TaskId),

    /// The caller pinned a version the list has moved past.
    #[error("list {list_id} is at {actual}, request was based on {expected}")]
    StaleVersion {
        /// Requested list.
        list_id: ListId,
        /// Version the caller observed.
        expected: ListVersion,
        /// Version currently stored.
        actual: ListVersion,
    },

    /// Concurrent writers kept invalidating the commit.
    #[error("list {list_id} kept changing; gave up after {attempts} attempt(s)")]
    CommitContention {
        /// Contended list.
        list_id: ListId,
        /// Attempts made.
        attempts: u32,
    },

    /// Storage failed.
    #[error(transparent)]
    Repository(TaskRepositoryError),
}

impl TaskOrderError {
    /// Returns the coarse class of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::AccessDenied { .. } => ErrorClass::Authorization,
            Self::ListNotFound(_) | Self::TaskNotFound(_) => ErrorClass::NotFound,
            Self::Validation(_) | Self::Domain(_) => ErrorClass::Validation,
            Self::UnknownMoveTarget(_)
            | Self::DuplicateTask(_)
            | Self::StaleVersion { .. }
            | Self::CommitContention { .. } => ErrorClass::Conflict,
            Self::Repository(_) => ErrorClass::Internal,
        }
    }

    /// Classifies an order engine rejection.
    ///
    /// Moves of vanished tasks are conflicts with another writer; everything
    /// else is a malformed request.
    pub(super) fn from_order(err: OrderError) -> Self {
        match err {
            OrderError::UnknownTask(id) => Self::UnknownMoveTarget(id),
            other => Self::Validation(other),
        }
    }
}

impl From<TaskRepositoryError> for TaskOrderError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::ListNotFound(id) => Self::ListNotFound(id),
            TaskRepositoryError::TaskNotFound(id) => Self::TaskNotFound(id),
            TaskRepositoryError::DuplicateTask(id) => Self::DuplicateTask(id),
            TaskRepositoryError::VersionConflict {
                list_id,
                expected,
                actual,
            } => Self::StaleVersion {
                list_id,
                expected,
                actual,
            },
            other => Self::Repository(other),
        }
    }
}

/// Result type for task order service operations.
pub type TaskOrderResult<T> = Result<T, TaskOrderError>;
