//! Port through which the client cache talks to the task service.

use crate::task::{
    domain::{ListId, Task, TaskId, UserId},
    ports::{ListRepository, TaskRepository},
    services::{
        CreateTaskRequest, CreatedTask, ErrorClass, ListSnapshot, ReorderRequest,
        TaskOrderError, TaskOrderService, UpdateTaskRequest,
    },
};
use async_trait::async_trait;
use mockable::Clock;
use thiserror::Error;

/// Errors surfaced by a [`TaskGateway`].
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The service rejected the request.
    #[error(transparent)]
    Rejected(#[from] TaskOrderError),
    /// The service could not be reached.
    #[error("task service unavailable: {0}")]
    Unavailable(String),
}

impl GatewayError {
    /// Returns the coarse class of the failure.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Rejected(err) => err.class(),
            Self::Unavailable(_) => ErrorClass::Internal,
        }
    }
}

/// Result type for gateway calls.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Task operations available to a client session.
///
/// Calls act on behalf of the session's authenticated user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskGateway: Send + Sync {
    /// Loads a list's ordered tasks.
    async fn load(&self, list_id: ListId) -> GatewayResult<ListSnapshot>;

    /// Appends a task.
    async fn create(&self, request: CreateTaskRequest) -> GatewayResult<CreatedTask>;

    /// Edits task fields.
    async fn update(&self, task_id: TaskId, request: UpdateTaskRequest) -> GatewayResult<Task>;

    /// Deletes a task and returns the renumbered list.
    async fn delete(&self, task_id: TaskId) -> GatewayResult<ListSnapshot>;

    /// Applies a structural change and returns the renumbered list.
    async fn reorder(&self, list_id: ListId, request: ReorderRequest)
    -> GatewayResult<ListSnapshot>;

    /// Removes completed tasks and returns the renumbered list.
    async fn clear_completed(&self, list_id: ListId) -> GatewayResult<ListSnapshot>;
}

/// In-process gateway calling a [`TaskOrderService`] as a fixed user.
pub struct LocalGateway<L, R, C>
where
    L: ListRepository,
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    service: TaskOrderService<L, R, C>,
    caller: UserId,
}

impl<L, R, C> LocalGateway<L, R, C>
where
    L: ListRepository,
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a gateway acting as `caller`.
    #[must_use]
    pub const fn new(service: TaskOrderService<L, R, C>, caller: UserId) -> Self {
        Self { service, caller }
    }
}

#[async_trait]
impl<L, R, C> TaskGateway for LocalGateway<L, R, C>
where
    L: ListRepository,
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    async fn load(&self, list_id: ListId) -> GatewayResult<ListSnapshot> {
        Ok(self.service.load(list_id, self.caller).await?)
    }

    async fn create(&self, request: CreateTaskRequest) -> GatewayResult<CreatedTask> {
        Ok(self.service.create_task(self.caller, request).await?)
    }

    async fn update(&self, task_id: TaskId, request: UpdateTaskRequest) -> GatewayResult<Task> {
        Ok(self.service.update_task(self.caller, task_id, request).await?)
    }

    async fn delete(&self, task_id: TaskId) -> GatewayResult<ListSnapshot> {
        Ok(self.service.delete_task(self.caller, task_id).await?)
    }

    async fn reorder(
        &self,
        list_id: ListId,
        request: ReorderRequest,
    ) -> GatewayResult<ListSnapshot> {
        Ok(self.service.reorder(list_id, self.caller, request).await?)
    }

    async fn clear_completed(&self, list_id: ListId) -> GatewayResult<ListSnapshot> {
        Ok(self.service.clear_completed(list_id, self.caller).await?)
    }
}
