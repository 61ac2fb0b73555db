//! Order engine: pure computation of a list's task sequence.
//!
//! Every function takes the current sequence of [`TaskSummary`] values for a
//! single list and returns the new sequence of task identifiers. The result
//! is always a permutation of the surviving members; nothing here creates or
//! persists tasks. [`renumber`] turns a sequence into the contiguous order
//! assignment `0..n` written back to storage.

use super::{OrderError, TaskDomainError, TaskId, TaskOrder, TaskSummary};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A structural change requested for a list's sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderOperation {
    /// Appends a new task at the end.
    Append {
        /// Task being appended.
        task_id: TaskId,
    },
    /// Removes tasks, keeping survivors in their relative order.
    RemoveIds {
        /// Tasks to remove; absent ids are ignored.
        task_ids: Vec<TaskId>,
    },
    /// Moves `moved` into the slot currently held by `target`.
    MoveToIndex {
        /// Task being moved.
        moved: TaskId,
        /// Task whose slot `moved` takes; it ends up directly after `moved`.
        target: TaskId,
    },
    /// Moves a task to the tail of the list.
    MoveToEnd {
        /// Task being moved.
        moved: TaskId,
    },
    /// Applies the due-date/completion sort policy.
    SortByPolicy,
    /// Applies an explicit caller-supplied ordering.
    Arrange {
        /// Requested order; members left out keep their relative order after
        /// the listed ones.
        task_ids: Vec<TaskId>,
    },
}

impl OrderOperation {
    /// Applies the operation to `current`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError`] when a move references an absent task or an
    /// arrangement is not a valid selection of list members.
    pub fn apply(&self, current: &[TaskSummary]) -> Result<Vec<TaskId>, OrderError> {
        match self {
            Self::Append { task_id } => Ok(append(current, *task_id)),
            Self::RemoveIds { task_ids } => Ok(remove_ids(current, task_ids)),
            Self::MoveToIndex { moved, target } => move_to_index(current, *moved, *target),
            Self::MoveToEnd { moved } => move_to_end(current, *moved),
            Self::SortByPolicy => Ok(sort_by_policy(current)),
            Self::Arrange { task_ids } => arrange(current, task_ids),
        }
    }

    /// Returns a short label used in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Append { .. } => "append",
            Self::RemoveIds { .. } => "remove_ids",
            Self::MoveToIndex { .. } => "move_to_index",
            Self::MoveToEnd { .. } => "move_to_end",
            Self::SortByPolicy => "sort_by_policy",
            Self::Arrange { .. } => "arrange",
        }
    }
}

/// A single `task → order` assignment produced by [`renumber`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderAssignment {
    /// Task receiving the order.
    pub task_id: TaskId,
    /// Assigned position.
    pub order: TaskOrder,
}

/// Returns the identifiers of `current` in sequence order.
#[must_use]
pub fn ids_of(current: &[TaskSummary]) -> Vec<TaskId> {
    current.iter().map(|summary| summary.id).collect()
}

/// Appends `task_id` to the sequence.
///
/// Appending an id that is already a member leaves the sequence unchanged.
#[must_use]
pub fn append(current: &[TaskSummary], task_id: TaskId) -> Vec<TaskId> {
    let mut ids = ids_of(current);
    if !ids.contains(&task_id) {
        ids.push(task_id);
    }
    ids
}

/// Removes `task_ids` from the sequence, preserving survivors' order.
#[must_use]
pub fn remove_ids(current: &[TaskSummary], task_ids: &[TaskId]) -> Vec<TaskId> {
    let doomed: HashSet<TaskId> = task_ids.iter().copied().collect();
    current
        .iter()
        .map(|summary| summary.id)
        .filter(|id| !doomed.contains(id))
        .collect()
}

/// Moves `moved` into the slot held by `target`.
///
/// `moved` is taken out of the sequence and reinserted immediately before
/// `target`. Repeating the same move is a no-op because `moved` already sits
/// directly before `target`.
///
/// # Errors
///
/// Returns [`OrderError::UnknownTask`] when either id is absent.
pub fn move_to_index(
    current: &[TaskSummary],
    moved: TaskId,
    target: TaskId,
) -> Result<Vec<TaskId>, OrderError> {
    let mut ids = ids_of(current);
    let from = position_of(&ids, moved)?;
    position_of(&ids, target)?;
    if moved == target {
        return Ok(ids);
    }

    ids.remove(from);
    let to = position_of(&ids, target)?;
    ids.insert(to, moved);
    Ok(ids)
}

/// Moves `moved` to the tail of the sequence.
///
/// # Errors
///
/// Returns [`OrderError::UnknownTask`] when `moved` is absent.
pub fn move_to_end(current: &[TaskSummary], moved: TaskId) -> Result<Vec<TaskId>, OrderError> {
    let mut ids = ids_of(current);
    let from = position_of(&ids, moved)?;
    ids.remove(from);
    ids.push(moved);
    Ok(ids)
}

/// Sorts the sequence into three stable buckets.
///
/// 1. Incomplete tasks with a due date, ascending by due date.
/// 2. Incomplete tasks without a due date.
/// 3. Completed tasks.
///
/// Ties keep their prior relative order, so the policy is idempotent.
#[must_use]
pub fn sort_by_policy(current: &[TaskSummary]) -> Vec<TaskId> {
    let mut with_due = Vec::new();
    let mut without_due = Vec::new();
    let mut completed = Vec::new();

    for summary in current {
        match (summary.completed, summary.due_at) {
            (true, _) => completed.push(summary.id),
            (false, Some(due_at)) => with_due.push((due_at, summary.id)),
            (false, None) => without_due.push(summary.id),
        }
    }
    with_due.sort_by_key(|(due_at, _)| *due_at);

    with_due
        .into_iter()
        .map(|(_, id)| id)
        .chain(without_due)
        .chain(completed)
        .collect()
}

/// Applies an explicit ordering supplied by a caller.
///
/// Listed ids come first in the requested order; members that were left out
/// follow in their prior relative order.
///
/// # Errors
///
/// Returns [`OrderError::DuplicateTask`] when an id is listed twice and
/// [`OrderError::ForeignTasks`] when listed ids are not members.
pub fn arrange(current: &[TaskSummary], requested: &[TaskId]) -> Result<Vec<TaskId>, OrderError> {
    let members: HashSet<TaskId> = current.iter().map(|summary| summary.id).collect();
    let mut seen = HashSet::with_capacity(requested.len());
    let mut foreign = Vec::new();

    for id in requested {
        if !members.contains(id) {
            foreign.push(*id);
        } else if !seen.insert(*id) {
            return Err(OrderError::DuplicateTask(*id));
        }
    }
    if !foreign.is_empty() {
        return Err(OrderError::ForeignTasks(foreign));
    }

    let mut ids = requested.to_vec();
    ids.extend(
        current
            .iter()
            .map(|summary| summary.id)
            .filter(|id| !seen.contains(id)),
    );
    Ok(ids)
}

/// Assigns `order = i` to the i-th id of `sequence`.
///
/// # Errors
///
/// Returns [`TaskDomainError::OrderOutOfRange`] when the sequence is longer
/// than the order column can represent.
pub fn renumber(sequence: &[TaskId]) -> Result<Vec<OrderAssignment>, TaskDomainError> {
    sequence
        .iter()
        .enumerate()
        .map(|(index, task_id)| {
            TaskOrder::from_index(index).map(|order| OrderAssignment {
                task_id: *task_id,
                order,
            })
        })
        .collect()
}

fn position_of(ids: &[TaskId], id: TaskId) -> Result<usize, OrderError> {
    ids.iter()
        .position(|candidate| *candidate == id)
        .ok_or(OrderError::UnknownTask(id))
}
