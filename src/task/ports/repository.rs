//! Repository ports for list ownership and ordered task persistence.

use crate::task::domain::{
    ListId, ListName, ListVersion, OrderAssignment, Task, TaskId, TaskList, TaskOrder, UserId,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// One atomic structural write to a list's sequence.
///
/// A commit removes `removed`, rewrites the order of every remaining task
/// from `assignments`, and bumps the list version. It succeeds only when the
/// list is still at `expected_version`; otherwise nothing is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCommit {
    /// List being rewritten.
    pub list_id: ListId,
    /// Version the caller observed when computing the commit.
    pub expected_version: ListVersion,
    /// Tasks deleted by this commit.
    pub removed: Vec<TaskId>,
    /// Full order assignment for every task that remains in the list.
    pub assignments: Vec<OrderAssignment>,
}

impl ListCommit {
    /// Creates a commit that only renumbers.
    #[must_use]
    pub const fn new(
        list_id: ListId,
        expected_version: ListVersion,
        assignments: Vec<OrderAssignment>,
    ) -> Self {
        Self {
            list_id,
            expected_version,
            removed: Vec::new(),
            assignments,
        }
    }

    /// Adds tasks deleted by this commit.
    #[must_use]
    pub fn removing(mut self, removed: impl IntoIterator<Item = TaskId>) -> Self {
        self.removed.extend(removed);
        self
    }

    /// Checks the commit against the list's current members.
    ///
    /// A valid commit only removes members and assigns every remaining
    /// member exactly once, with orders forming `0..n`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::IncompleteCommit`] otherwise.
    pub fn validate_against(&self, members: &HashSet<TaskId>) -> TaskRepositoryResult<()> {
        let incomplete = || TaskRepositoryError::IncompleteCommit(self.list_id);

        let removed: HashSet<TaskId> = self.removed.iter().copied().collect();
        if !removed.is_subset(members) {
            return Err(incomplete());
        }

        let remaining: HashSet<TaskId> = members.difference(&removed).copied().collect();
        let assigned: HashSet<TaskId> = self.assignments.iter().map(|a| a.task_id).collect();
        if assigned.len() != self.assignments.len() || assigned != remaining {
            return Err(incomplete());
        }

        let mut orders: Vec<TaskOrder> = self.assignments.iter().map(|a| a.order).collect();
        orders.sort_unstable();
        let contiguous = orders.iter().enumerate().all(|(index, order)| {
            TaskOrder::from_index(index).is_ok_and(|expected| expected == *order)
        });
        if !contiguous {
            return Err(incomplete());
        }
        Ok(())
    }
}

/// List ownership contract.
#[async_trait]
pub trait ListRepository: Send + Sync {
    /// Stores a new list.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateList`] when the identifier is
    /// already in use.
    async fn store(&self, list: &TaskList) -> TaskRepositoryResult<()>;

    /// Finds a list by identifier.
    async fn find_by_id(&self, id: ListId) -> TaskRepositoryResult<Option<TaskList>>;

    /// Returns every list owned by `owner`, oldest first.
    async fn find_by_owner(&self, owner: UserId) -> TaskRepositoryResult<Vec<TaskList>>;

    /// Returns the identifiers of all lists.
    async fn list_ids(&self) -> TaskRepositoryResult<Vec<ListId>>;

    /// Renames a list and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::ListNotFound`] when the list does not
    /// exist.
    async fn rename(&self, id: ListId, name: &ListName) -> TaskRepositoryResult<TaskList>;

    /// Deletes a list together with all of its tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::ListNotFound`] when the list does not
    /// exist.
    async fn delete(&self, id: ListId) -> TaskRepositoryResult<()>;
}

/// Ordered task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Inserts a new task and bumps the owning list's version.
    ///
    /// The task's order is written as given; no other task is renumbered.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::VersionConflict`] when the list moved
    /// past `expected_version`, [`TaskRepositoryError::ListNotFound`] when the
    /// list is gone, and [`TaskRepositoryError::DuplicateTask`] when the task
    /// identifier already exists.
    async fn insert(
        &self,
        task: &Task,
        expected_version: ListVersion,
    ) -> TaskRepositoryResult<ListVersion>;

    /// Persists field edits of an existing task. The stored order is kept.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::TaskNotFound`] when the task does not
    /// exist.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Loads a list's tasks ordered by order, then creation time, then id.
    async fn load_list(&self, list_id: ListId) -> TaskRepositoryResult<Vec<Task>>;

    /// Applies a [`ListCommit`] atomically and returns the new list version.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::VersionConflict`] when the list moved
    /// past the expected version and
    /// [`TaskRepositoryError::IncompleteCommit`] when the assignments do not
    /// cover exactly the remaining tasks. Nothing is written on error.
    async fn commit(&self, commit: &ListCommit) -> TaskRepositoryResult<ListVersion>;
}

/// Errors returned by repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// A list with the same identifier already exists.
    #[error("duplicate list identifier: {0}")]
    DuplicateList(ListId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The list was not found.
    #[error("list not found: {0}")]
    ListNotFound(ListId),

    /// The list changed since the caller observed it.
    #[error("list {list_id} is at {actual}, expected {expected}")]
    VersionConflict {
        /// List being written.
        list_id: ListId,
        /// Version the caller observed.
        expected: ListVersion,
        /// Version currently stored.
        actual: ListVersion,
    },

    /// A commit's assignments do not match the list's remaining tasks.
    #[error("commit for list {0} does not cover exactly its remaining tasks")]
    IncompleteCommit(ListId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
