//! Reconciliation service: authorizes list access and persists task order.

use super::{
    error::{TaskOrderError, TaskOrderResult},
    requests::{
        CreateTaskRequest, CreatedTask, ForeignIdPolicy, ListSnapshot, ReorderPolicy,
        ReorderRequest, UpdateTaskRequest,
    },
};
use crate::task::{
    domain::{
        ListId, ListName, ListVersion, NewTask, OrderError, OrderOperation, Task, TaskId,
        TaskList, TaskName, TaskOrder, TaskSummary, UserId, order,
    },
    ports::{ListCommit, ListRepository, TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Result of a committed (or skipped) renumbering.
pub(super) struct CommitOutcome {
    pub(super) snapshot: ListSnapshot,
    pub(super) repositioned: usize,
}

/// Whose access a list read is checked against.
#[derive(Debug, Clone, Copy)]
pub(super) enum Access {
    /// An authenticated user who must own the list.
    Owner(UserId),
    /// Maintenance jobs that run outside any user session.
    Maintenance,
}

/// Orchestrates list ownership checks, the order engine and the store.
///
/// Every structural write loads the persisted sequence afresh, computes the
/// new sequence with the order engine and stores a full renumbering in one
/// version-guarded [`ListCommit`].
pub struct TaskOrderService<L, R, C>
where
    L: ListRepository,
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    lists: Arc<L>,
    tasks: Arc<R>,
    clock: Arc<C>,
    policy: ReorderPolicy,
}

impl<L, R, C> Clone for TaskOrderService<L, R, C>
where
    L: ListRepository,
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            lists: Arc::clone(&self.lists),
            tasks: Arc::clone(&self.tasks),
            clock: Arc::clone(&self.clock),
            policy: self.policy,
        }
    }
}

impl<L, R, C> TaskOrderService<L, R, C>
where
    L: ListRepository,
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a service with the default [`ReorderPolicy`].
    #[must_use]
    pub fn new(lists: Arc<L>, tasks: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            lists,
            tasks,
            clock,
            policy: ReorderPolicy::default(),
        }
    }

    /// Replaces the reorder policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: ReorderPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the active reorder policy.
    #[must_use]
    pub const fn policy(&self) -> ReorderPolicy {
        self.policy
    }

    /// Creates an empty list owned by `caller`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskOrderError::Domain`] for a blank name and
    /// [`TaskOrderError::Repository`] when storage fails.
    #[instrument(skip(self, name), fields(caller = %caller))]
    pub async fn create_list(&self, caller: UserId, name: &str) -> TaskOrderResult<TaskList> {
        let list = TaskList::new(caller, ListName::new(name)?, &*self.clock);
        self.lists.store(&list).await?;
        info!(list_id = %list.id(), "list created");
        Ok(list)
    }

    /// Returns every list owned by `caller`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskOrderError::Repository`] when storage fails.
    pub async fn lists_for(&self, caller: UserId) -> TaskOrderResult<Vec<TaskList>> {
        Ok(self.lists.find_by_owner(caller).await?)
    }

    /// Renames a list. Its tasks and sequence version are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskOrderError::Domain`] for a blank or overlong name and
    /// the access errors of [`Self::load`].
    #[instrument(skip(self, name), fields(list_id = %list_id, caller = %caller))]
    pub async fn rename_list(
        &self,
        list_id: ListId,
        caller: UserId,
        name: &str,
    ) -> TaskOrderResult<TaskList> {
        let new_name = ListName::new(name)?;
        self.authorize(list_id, Access::Owner(caller)).await?;
        let list = self.lists.rename(list_id, &new_name).await?;
        debug!("list renamed");
        Ok(list)
    }

    /// Deletes a list and all of its tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskOrderError::ListNotFound`] or
    /// [`TaskOrderError::AccessDenied`] when the caller cannot see the list.
    #[instrument(skip(self), fields(list_id = %list_id, caller = %caller))]
    pub async fn delete_list(&self, list_id: ListId, caller: UserId) -> TaskOrderResult<()> {
        self.authorize(list_id, Access::Owner(caller)).await?;
        self.lists.delete(list_id).await?;
        info!("list deleted");
        Ok(())
    }

    /// Loads a list's tasks in order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskOrderError::ListNotFound`] or
    /// [`TaskOrderError::AccessDenied`] when the caller cannot see the list.
    pub async fn load(&self, list_id: ListId, caller: UserId) -> TaskOrderResult<ListSnapshot> {
        let list = self.authorize(list_id, Access::Owner(caller)).await?;
        let tasks = self.tasks.load_list(list_id).await?;
        Ok(ListSnapshot {
            list_id,
            version: list.version(),
            tasks,
        })
    }

    /// Appends a task to the end of a list.
    ///
    /// The new task gets `order = n` for a list of `n` tasks; no other task
    /// is renumbered.
    ///
    /// # Errors
    ///
    /// Returns [`TaskOrderError::Domain`] for a blank name,
    /// [`TaskOrderError::DuplicateTask`] when a caller-supplied id is taken,
    /// and the access errors of [`Self::load`].
    #[instrument(skip(self, request), fields(list_id = %request.list_id, caller = %caller))]
    pub async fn create_task(
        &self,
        caller: UserId,
        request: CreateTaskRequest,
    ) -> TaskOrderResult<CreatedTask> {
        let CreateTaskRequest {
            list_id,
            id,
            name,
            completed,
            due_at,
        } = request;
        let new_task = NewTask {
            id: id.unwrap_or_default(),
            list_id,
            name: TaskName::new(name)?,
            completed,
            due_at,
        };

        let attempts = self.policy.commit_attempts();
        for attempt in 1..=attempts {
            let list = self.authorize(list_id, Access::Owner(caller)).await?;
            let count = self.tasks.load_list(list_id).await?.len();
            let task = Task::new(new_task.clone(), TaskOrder::from_index(count)?, &*self.clock);

            match self.tasks.insert(&task, list.version()).await {
                Ok(version) => {
                    info!(task_id = %task.id(), order = %task.order(), %version, "task appended");
                    return Ok(CreatedTask { task, version });
                }
                Err(TaskRepositoryError::VersionConflict { actual, .. }) => {
                    warn!(attempt, %actual, "list changed during append, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(TaskOrderError::CommitContention { list_id, attempts })
    }

    /// Applies field edits to a task. Order and list version are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskOrderError::TaskNotFound`] when the task is missing,
    /// [`TaskOrderError::Domain`] for a blank name, and the access errors of
    /// [`Self::load`] for the owning list.
    #[instrument(skip(self, request), fields(task_id = %task_id, caller = %caller))]
    pub async fn update_task(
        &self,
        caller: UserId,
        task_id: TaskId,
        request: UpdateTaskRequest,
    ) -> TaskOrderResult<Task> {
        let mut task = self.owned_task(task_id, caller).await?;
        if request.is_empty() {
            return Ok(task);
        }

        let UpdateTaskRequest {
            name,
            completed,
            due_at,
        } = request;
        if let Some(raw_name) = name {
            task.rename(TaskName::new(raw_name)?, &*self.clock);
        }
        if let Some(done) = completed {
            task.set_completed(done, &*self.clock);
        }
        if let Some(due) = due_at {
            task.set_due_at(due, &*self.clock);
        }

        self.tasks.update(&task).await?;
        debug!("task fields updated");
        Ok(task)
    }

    /// Deletes a task and renumbers the rest of its list.
    ///
    /// # Errors
    ///
    /// Returns [`TaskOrderError::TaskNotFound`] when the task is missing and
    /// the errors of [`Self::reorder`].
    pub async fn delete_task(
        &self,
        caller: UserId,
        task_id: TaskId,
    ) -> TaskOrderResult<ListSnapshot> {
        let task = self.owned_task(task_id, caller).await?;
        let request = ReorderRequest::new(OrderOperation::RemoveIds {
            task_ids: vec![task_id],
        });
        self.reorder(task.list_id(), caller, request).await
    }

    /// Removes every completed task from a list and renumbers the rest.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::reorder`].
    #[instrument(skip(self), fields(list_id = %list_id, caller = %caller))]
    pub async fn clear_completed(
        &self,
        list_id: ListId,
        caller: UserId,
    ) -> TaskOrderResult<ListSnapshot> {
        let outcome = self
            .commit_sequence(list_id, Access::Owner(caller), None, |current| {
                let completed: Vec<TaskId> = current
                    .iter()
                    .filter(|summary| summary.completed)
                    .map(|summary| summary.id)
                    .collect();
                Ok(order::remove_ids(current, &completed))
            })
            .await?;
        Ok(outcome.snapshot)
    }

    /// Applies a structural change to a list's sequence.
    ///
    /// The persisted sequence is reloaded, the operation applied to it, and
    /// every remaining task renumbered `0..n` in a single atomic commit. When
    /// the request pins a version the commit fails on any intervening write;
    /// otherwise it is retried on fresh state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskOrderError::UnknownMoveTarget`] for moves of absent
    /// tasks, [`TaskOrderError::Validation`] for invalid arrangements,
    /// [`TaskOrderError::StaleVersion`] for stale pins,
    /// [`TaskOrderError::CommitContention`] when retries run out, and the
    /// access errors of [`Self::load`].
    #[instrument(
        skip(self, request),
        fields(list_id = %list_id, caller = %caller, operation = request.operation.label())
    )]
    pub async fn reorder(
        &self,
        list_id: ListId,
        caller: UserId,
        request: ReorderRequest,
    ) -> TaskOrderResult<ListSnapshot> {
        let foreign_ids = self.policy.foreign_ids();
        let ReorderRequest {
            operation,
            expected_version,
        } = request;

        let outcome = self
            .commit_sequence(
                list_id,
                Access::Owner(caller),
                expected_version,
                |current| {
                    let sanitized = sanitize(&operation, current, foreign_ids)?;
                    sanitized
                        .apply(current)
                        .map_err(TaskOrderError::from_order)
                },
            )
            .await
            .inspect_err(|err| warn!(error = %err, "reorder rejected"))?;
        Ok(outcome.snapshot)
    }

    pub(super) async fn authorize(
        &self,
        list_id: ListId,
        access: Access,
    ) -> TaskOrderResult<TaskList> {
        let list = self
            .lists
            .find_by_id(list_id)
            .await?
            .ok_or(TaskOrderError::ListNotFound(list_id))?;

        if let Access::Owner(caller) = access
            && !list.is_owned_by(caller)
        {
            warn!(%list_id, %caller, "list access denied");
            return Err(TaskOrderError::AccessDenied { list_id, caller });
        }
        Ok(list)
    }

    pub(super) async fn list_ids(&self) -> TaskOrderResult<Vec<ListId>> {
        Ok(self.lists.list_ids().await?)
    }

    pub(super) async fn tasks_of(&self, list_id: ListId) -> TaskOrderResult<Vec<Task>> {
        Ok(self.tasks.load_list(list_id).await?)
    }

    async fn owned_task(&self, task_id: TaskId, caller: UserId) -> TaskOrderResult<Task> {
        let task = self
            .tasks
            .find_by_id(task_id)
            .await?
            .ok_or(TaskOrderError::TaskNotFound(task_id))?;
        self.authorize(task.list_id(), Access::Owner(caller)).await?;
        Ok(task)
    }

    /// Loads, plans and commits a full renumbering, retrying on contention.
    ///
    /// `plan` maps the persisted sequence to the new one; members it leaves
    /// out are deleted. A plan that changes nothing on an already contiguous
    /// list is not committed and keeps the version.
    pub(super) async fn commit_sequence<F>(
        &self,
        list_id: ListId,
        access: Access,
        pinned: Option<ListVersion>,
        plan: F,
    ) -> TaskOrderResult<CommitOutcome>
    where
        F: Fn(&[TaskSummary]) -> TaskOrderResult<Vec<TaskId>> + Send + Sync,
    {
        let attempts = self.policy.commit_attempts();
        for attempt in 1..=attempts {
            let list = self.authorize(list_id, access).await?;
            let observed = list.version();
            if let Some(expected) = pinned
                && expected != observed
            {
                return Err(TaskOrderError::StaleVersion {
                    list_id,
                    expected,
                    actual: observed,
                });
            }

            let current = self.tasks.load_list(list_id).await?;
            let summaries: Vec<TaskSummary> = current.iter().map(Task::summary).collect();
            let sequence = plan(&summaries)?;
            let assignments = order::renumber(&sequence)?;
            debug!(attempt, tasks = sequence.len(), "sequence computed");

            let kept: HashSet<TaskId> = sequence.iter().copied().collect();
            let removed: Vec<TaskId> = current
                .iter()
                .map(Task::id)
                .filter(|id| !kept.contains(id))
                .collect();
            let repositioned = count_repositioned(&current, &assignments);
            if removed.is_empty() && repositioned == 0 {
                return Ok(CommitOutcome {
                    snapshot: ListSnapshot {
                        list_id,
                        version: observed,
                        tasks: current,
                    },
                    repositioned,
                });
            }

            let commit = ListCommit::new(list_id, observed, assignments).removing(removed);
            match self.tasks.commit(&commit).await {
                Ok(version) => {
                    info!(
                        %version,
                        removed = commit.removed.len(),
                        repositioned,
                        "list order committed"
                    );
                    return Ok(CommitOutcome {
                        snapshot: committed_view(list_id, version, current, &commit),
                        repositioned,
                    });
                }
                Err(TaskRepositoryError::VersionConflict { actual, .. }) => {
                    if let Some(expected) = pinned {
                        return Err(TaskOrderError::StaleVersion {
                            list_id,
                            expected,
                            actual,
                        });
                    }
                    warn!(attempt, %actual, "list changed during commit, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(TaskOrderError::CommitContention { list_id, attempts })
    }
}

/// Brings a requested operation in line with the list's actual members.
fn sanitize(
    operation: &OrderOperation,
    current: &[TaskSummary],
    foreign_ids: ForeignIdPolicy,
) -> TaskOrderResult<OrderOperation> {
    let members: HashSet<TaskId> = current.iter().map(|summary| summary.id).collect();
    match operation {
        OrderOperation::Append { task_id } if !members.contains(task_id) => Err(
            TaskOrderError::Validation(OrderError::ForeignTasks(vec![*task_id])),
        ),
        OrderOperation::Arrange { task_ids } if foreign_ids == ForeignIdPolicy::Ignore => {
            let mut seen = HashSet::with_capacity(task_ids.len());
            let kept = task_ids
                .iter()
                .copied()
                .filter(|id| members.contains(id) && seen.insert(*id))
                .collect();
            Ok(OrderOperation::Arrange { task_ids: kept })
        }
        other => Ok(other.clone()),
    }
}

fn count_repositioned(current: &[Task], assignments: &[order::OrderAssignment]) -> usize {
    let before: HashMap<TaskId, TaskOrder> =
        current.iter().map(|task| (task.id(), task.order())).collect();
    assignments
        .iter()
        .filter(|assignment| before.get(&assignment.task_id) != Some(&assignment.order))
        .count()
}

/// Builds the view of what `commit` wrote without another round trip.
fn committed_view(
    list_id: ListId,
    version: ListVersion,
    current: Vec<Task>,
    commit: &ListCommit,
) -> ListSnapshot {
    let orders: HashMap<TaskId, TaskOrder> = commit
        .assignments
        .iter()
        .map(|assignment| (assignment.task_id, assignment.order))
        .collect();
    let mut tasks: Vec<Task> = current
        .into_iter()
        .filter_map(|mut task| {
            let assigned = orders.get(&task.id()).copied()?;
            task.reposition(assigned);
            Some(task)
        })
        .collect();
    tasks.sort_by_key(Task::order);
    ListSnapshot {
        list_id,
        version,
        tasks,
    }
}
