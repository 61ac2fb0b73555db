//! Optimistic client-side mirror of one list's task sequence.
//!
//! A user action is applied to a tentative copy of the last confirmed
//! snapshot before the request is sent. The server's answer replaces the
//! tentative state; a failure restores the snapshot and raises a notice.

use super::gateway::{GatewayError, GatewayResult, TaskGateway};
use crate::task::{
    domain::{
        ListId, NewTask, OrderError, OrderOperation, Task, TaskDomainError, TaskId, TaskName,
        TaskOrder, TaskSummary, order,
    },
    services::{
        CreateTaskRequest, CreatedTask, ErrorClass, ListSnapshot, ReorderRequest,
        UpdateTaskRequest,
    },
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Lifecycle of a cached list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheState {
    /// Nothing loaded yet.
    Idle,
    /// The first load is in flight.
    Loading,
    /// The last confirmed server view.
    Ready(ListSnapshot),
    /// A request is in flight; `tentative` is shown until it resolves.
    Pending {
        /// Confirmed view to fall back to.
        snapshot: ListSnapshot,
        /// Optimistically updated tasks.
        tentative: Vec<Task>,
    },
}

impl CacheState {
    /// Returns the tasks currently shown, if any.
    #[must_use]
    pub fn visible(&self) -> Option<&[Task]> {
        match self {
            Self::Ready(snapshot) => Some(&snapshot.tasks),
            Self::Pending { tentative, .. } => Some(tentative),
            Self::Idle | Self::Loading => None,
        }
    }

    /// Returns whether a request is in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// An interaction with the list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// Add a task at the end.
    Add {
        /// Identifier generated on the client.
        id: TaskId,
        /// Task name.
        name: String,
        /// Optional due timestamp.
        due_at: Option<DateTime<Utc>>,
    },
    /// Flip a task's completion flag.
    Toggle(TaskId),
    /// Delete a task.
    Delete(TaskId),
    /// Delete every completed task.
    ClearCompleted,
    /// Apply the due-date/completion sort.
    Sort,
    /// Move a task into another task's slot, or to the end without a target.
    Move {
        /// Task being moved.
        moved: TaskId,
        /// Task whose slot it takes.
        target: Option<TaskId>,
    },
    /// Apply an explicit order, as produced by a drop.
    Arrange(Vec<TaskId>),
}

impl UserAction {
    /// Creates an add action with a fresh identifier.
    #[must_use]
    pub fn add(name: impl Into<String>) -> Self {
        Self::Add {
            id: TaskId::new(),
            name: name.into(),
            due_at: None,
        }
    }

    const fn failure_message(&self) -> &'static str {
        match self {
            Self::Add { .. } => "Failed to add task",
            Self::Toggle(_) => "Failed to update task",
            Self::Delete(_) => "Failed to delete task",
            Self::ClearCompleted => "Failed to clear completed tasks",
            Self::Sort | Self::Move { .. } | Self::Arrange(_) => "Failed to reorder tasks",
        }
    }
}

/// The gateway call implied by a user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingRequest {
    /// Append a task.
    Create(CreateTaskRequest),
    /// Edit task fields.
    Update {
        /// Edited task.
        task_id: TaskId,
        /// Field edits.
        request: UpdateTaskRequest,
    },
    /// Delete a task.
    Delete(TaskId),
    /// Structural change of the list.
    Reorder(ReorderRequest),
    /// Delete completed tasks.
    ClearCompleted,
}

/// A successful gateway answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// The full renumbered list.
    Snapshot(ListSnapshot),
    /// A newly appended task.
    Created(CreatedTask),
    /// An edited task.
    Updated(Task),
}

/// Dismissible message shown after a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    message: String,
    class: ErrorClass,
}

impl Notice {
    /// Returns the message to show.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the class of the failure behind the notice.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        self.class
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Errors returned by [`SequenceCache`].
#[derive(Debug, Error)]
pub enum CacheError {
    /// Another request for this list has not resolved yet.
    #[error("a request for this list is still in flight")]
    RequestInFlight,
    /// The list has not been loaded.
    #[error("the list has not been loaded")]
    NotReady,
    /// The action referenced a task that is not in the view.
    #[error("task {0} is not in the list")]
    UnknownTask(TaskId),
    /// The action is not a valid change of the sequence.
    #[error(transparent)]
    Order(#[from] OrderError),
    /// The action carried an invalid value.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The request failed; the view was rolled back.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Client-held sequence of one list, reconciled against the service.
///
/// `perform` takes `&mut self`, so one cache never has two requests in
/// flight.
pub struct SequenceCache<G, C>
where
    G: TaskGateway + ?Sized,
    C: Clock,
{
    gateway: Arc<G>,
    clock: Arc<C>,
    list_id: ListId,
    state: CacheState,
    notice: Option<Notice>,
    pending_failure: &'static str,
    pin_versions: bool,
    out_of_date: bool,
}

impl<G, C> SequenceCache<G, C>
where
    G: TaskGateway + ?Sized,
    C: Clock,
{
    /// Creates an idle cache for `list_id`.
    #[must_use]
    pub const fn new(gateway: Arc<G>, clock: Arc<C>, list_id: ListId) -> Self {
        Self {
            gateway,
            clock,
            list_id,
            state: CacheState::Idle,
            notice: None,
            pending_failure: "",
            pin_versions: false,
            out_of_date: false,
        }
    }

    /// Sends the confirmed version with structural requests so they fail
    /// instead of overwriting concurrent changes.
    #[must_use]
    pub const fn with_version_pinning(mut self) -> Self {
        self.pin_versions = true;
        self
    }

    /// Returns the cached list.
    #[must_use]
    pub const fn list_id(&self) -> ListId {
        self.list_id
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> &CacheState {
        &self.state
    }

    /// Returns the tasks currently shown; empty before the first load.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        self.state.visible().unwrap_or_default()
    }

    /// Returns whether the confirmed view missed writes from another session
    /// and must be reloaded before it can be trusted.
    ///
    /// [`Self::perform`] reloads on its own; callers driving
    /// [`Self::begin`] and [`Self::resolve`] by hand call [`Self::load`].
    #[must_use]
    pub const fn is_out_of_date(&self) -> bool {
        self.out_of_date
    }

    /// Returns the pending notice, if any.
    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Dismisses the notice.
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Loads (or reloads) the list from the service.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::RequestInFlight`] while a request is pending
    /// and [`CacheError::Gateway`] when the load fails; a previously loaded
    /// view is kept in that case.
    pub async fn load(&mut self) -> Result<(), CacheError> {
        if self.state.is_pending() {
            return Err(CacheError::RequestInFlight);
        }
        let prior = std::mem::replace(&mut self.state, CacheState::Loading);

        match self.gateway.load(self.list_id).await {
            Ok(snapshot) => {
                self.state = CacheState::Ready(snapshot);
                self.out_of_date = false;
                Ok(())
            }
            Err(err) => {
                self.state = match prior {
                    CacheState::Ready(snapshot) => CacheState::Ready(snapshot),
                    _ => CacheState::Idle,
                };
                self.raise("Failed to load tasks from server", &err);
                Err(err.into())
            }
        }
    }

    /// Applies `action` optimistically and enters the pending state.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::RequestInFlight`] while another request is
    /// pending, [`CacheError::NotReady`] before the first load, and
    /// [`CacheError::UnknownTask`], [`CacheError::Order`] or
    /// [`CacheError::Domain`] when the action cannot be applied. The state is
    /// unchanged on error.
    pub fn begin(&mut self, action: UserAction) -> Result<PendingRequest, CacheError> {
        let snapshot = match &self.state {
            CacheState::Ready(snapshot) => snapshot,
            CacheState::Pending { .. } => return Err(CacheError::RequestInFlight),
            CacheState::Idle | CacheState::Loading => return Err(CacheError::NotReady),
        };

        let failure = action.failure_message();
        let (tentative, request) = self.plan(snapshot, action)?;
        let confirmed = std::mem::replace(&mut self.state, CacheState::Idle);
        if let CacheState::Ready(prior) = confirmed {
            self.state = CacheState::Pending {
                snapshot: prior,
                tentative,
            };
        }
        self.pending_failure = failure;
        Ok(request)
    }

    /// Resolves the pending request with the gateway's answer.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NotReady`] when nothing is pending and
    /// [`CacheError::Gateway`] after rolling back a failed request.
    pub fn resolve(&mut self, outcome: GatewayResult<Confirmation>) -> Result<(), CacheError> {
        let CacheState::Pending { snapshot, .. } =
            std::mem::replace(&mut self.state, CacheState::Idle)
        else {
            return Err(CacheError::NotReady);
        };

        match outcome {
            Ok(confirmation) => {
                let (view, current) = confirmed_view(snapshot, confirmation);
                self.state = CacheState::Ready(view);
                self.out_of_date = !current;
                Ok(())
            }
            Err(err) => {
                self.state = CacheState::Ready(snapshot);
                self.raise(self.pending_failure, &err);
                Err(err.into())
            }
        }
    }

    /// Applies `action` optimistically, sends it and reconciles the answer.
    ///
    /// When the answer shows that another session wrote to the list in the
    /// meantime, the list is reloaded before the cache is ready again.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::begin`] and [`Self::resolve`], and those
    /// of [`Self::load`] when the follow-up reload fails.
    pub async fn perform(&mut self, action: UserAction) -> Result<(), CacheError> {
        let request = self.begin(action)?;
        let outcome = dispatch(&*self.gateway, self.list_id, request).await;
        self.resolve(outcome)?;
        if self.out_of_date {
            tracing::debug!(list_id = %self.list_id, "list changed elsewhere, reloading");
            self.load().await?;
        }
        Ok(())
    }

    fn raise(&mut self, message: &str, err: &GatewayError) {
        tracing::warn!(list_id = %self.list_id, error = %err, "{message}");
        self.notice = Some(Notice {
            message: message.to_owned(),
            class: err.class(),
        });
    }

    fn reorder_request(&self, snapshot: &ListSnapshot, operation: OrderOperation) -> PendingRequest {
        let request = ReorderRequest::new(operation);
        PendingRequest::Reorder(if self.pin_versions {
            request.expecting_version(snapshot.version)
        } else {
            request
        })
    }

    fn plan(
        &self,
        snapshot: &ListSnapshot,
        action: UserAction,
    ) -> Result<(Vec<Task>, PendingRequest), CacheError> {
        let summaries: Vec<TaskSummary> = snapshot.tasks.iter().map(Task::summary).collect();
        match action {
            UserAction::Add { id, name, due_at } => {
                let new_task = NewTask {
                    id,
                    list_id: self.list_id,
                    name: TaskName::new(name.as_str())?,
                    completed: false,
                    due_at,
                };
                let position = TaskOrder::from_index(snapshot.len())?;
                let mut tentative = snapshot.tasks.clone();
                tentative.push(Task::new(new_task, position, &*self.clock));

                let mut request = CreateTaskRequest::new(self.list_id, name).with_id(id);
                if let Some(due) = due_at {
                    request = request.with_due_at(due);
                }
                Ok((tentative, PendingRequest::Create(request)))
            }
            UserAction::Toggle(task_id) => {
                let mut tentative = snapshot.tasks.clone();
                let task = tentative
                    .iter_mut()
                    .find(|task| task.id() == task_id)
                    .ok_or(CacheError::UnknownTask(task_id))?;
                let completed = !task.completed();
                task.set_completed(completed, &*self.clock);
                let request = UpdateTaskRequest::new().completed(completed);
                Ok((tentative, PendingRequest::Update { task_id, request }))
            }
            UserAction::Delete(task_id) => {
                if snapshot.task(task_id).is_none() {
                    return Err(CacheError::UnknownTask(task_id));
                }
                let sequence = order::remove_ids(&summaries, &[task_id]);
                Ok((
                    rearranged(&snapshot.tasks, &sequence)?,
                    PendingRequest::Delete(task_id),
                ))
            }
            UserAction::ClearCompleted => {
                let completed: Vec<TaskId> = summaries
                    .iter()
                    .filter(|summary| summary.completed)
                    .map(|summary| summary.id)
                    .collect();
                let sequence = order::remove_ids(&summaries, &completed);
                Ok((
                    rearranged(&snapshot.tasks, &sequence)?,
                    PendingRequest::ClearCompleted,
                ))
            }
            UserAction::Sort => {
                let operation = OrderOperation::SortByPolicy;
                let sequence = operation.apply(&summaries)?;
                Ok((
                    rearranged(&snapshot.tasks, &sequence)?,
                    self.reorder_request(snapshot, operation),
                ))
            }
            UserAction::Move { moved, target } => {
                let operation = match target {
                    Some(target_id) => OrderOperation::MoveToIndex {
                        moved,
                        target: target_id,
                    },
                    None => OrderOperation::MoveToEnd { moved },
                };
                let sequence = operation.apply(&summaries)?;
                Ok((
                    rearranged(&snapshot.tasks, &sequence)?,
                    self.reorder_request(snapshot, operation),
                ))
            }
            UserAction::Arrange(task_ids) => {
                let operation = OrderOperation::Arrange { task_ids };
                let sequence = operation.apply(&summaries)?;
                Ok((
                    rearranged(&snapshot.tasks, &sequence)?,
                    self.reorder_request(snapshot, operation),
                ))
            }
        }
    }
}

/// Sends `request` through `gateway`.
async fn dispatch<G>(
    gateway: &G,
    list_id: ListId,
    request: PendingRequest,
) -> GatewayResult<Confirmation>
where
    G: TaskGateway + ?Sized,
{
    match request {
        PendingRequest::Create(create) => gateway.create(create).await.map(Confirmation::Created),
        PendingRequest::Update { task_id, request } => gateway
            .update(task_id, request)
            .await
            .map(Confirmation::Updated),
        PendingRequest::Delete(task_id) => {
            gateway.delete(task_id).await.map(Confirmation::Snapshot)
        }
        PendingRequest::Reorder(reorder) => gateway
            .reorder(list_id, reorder)
            .await
            .map(Confirmation::Snapshot),
        PendingRequest::ClearCompleted => gateway
            .clear_completed(list_id)
            .await
            .map(Confirmation::Snapshot),
    }
}

/// Orders `tasks` by `sequence`, dropping tasks it leaves out.
fn rearranged(tasks: &[Task], sequence: &[TaskId]) -> Result<Vec<Task>, CacheError> {
    let by_id: HashMap<TaskId, &Task> = tasks.iter().map(|task| (task.id(), task)).collect();
    sequence
        .iter()
        .enumerate()
        .map(|(index, id)| {
            let mut task = by_id
                .get(id)
                .map(|task| (*task).clone())
                .ok_or(CacheError::UnknownTask(*id))?;
            task.reposition(TaskOrder::from_index(index)?);
            Ok(task)
        })
        .collect()
}

/// Builds the confirmed view from the server's answer.
///
/// The flag is false when the answer proves the view missed another
/// session's write. The view then keeps the prior version, so a pinned
/// request made from it cannot pass the server's version check.
fn confirmed_view(prior: ListSnapshot, confirmation: Confirmation) -> (ListSnapshot, bool) {
    match confirmation {
        Confirmation::Snapshot(snapshot) => (snapshot, true),
        Confirmation::Created(CreatedTask { task, version }) => {
            let current = version == prior.version.next();
            let mut tasks: Vec<Task> = prior
                .tasks
                .into_iter()
                .filter(|existing| existing.id() != task.id())
                .collect();
            tasks.push(task);
            tasks.sort_by_key(Task::order);
            let view = ListSnapshot {
                list_id: prior.list_id,
                version: if current { version } else { prior.version },
                tasks,
            };
            (view, current)
        }
        Confirmation::Updated(task) => {
            let tasks = prior
                .tasks
                .into_iter()
                .map(|existing| {
                    if existing.id() == task.id() {
                        task.clone()
                    } else {
                        existing
                    }
                })
                .collect();
            let view = ListSnapshot {
                list_id: prior.list_id,
                version: prior.version,
                tasks,
            };
            (view, true)
        }
    }
}
