//! Router and handlers of the task API.

use super::{
    auth::{Caller, TokenVerifier},
    dto::{
        CreateTaskBody, ListBody, ListNameBody, ListQuery, MoveBody, ReorderBody, SnapshotBody,
        SortBody, TaskBody, UpdateTaskBody,
    },
    error::{ApiError, ApiResult},
};
use crate::task::{
    domain::{ListId, ListVersion, OrderOperation, TaskId},
    ports::{ListRepository, TaskRepository},
    services::{CreateTaskRequest, ReorderRequest, TaskOrderService, UpdateTaskRequest},
};
use axum::{
    Json, Router,
    extract::{
        FromRef, Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{delete, get, post, put},
};
use mockable::Clock;
use std::sync::Arc;

/// Shared state of the task API.
pub struct ApiState<L, R, C>
where
    L: ListRepository,
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    service: Arc<TaskOrderService<L, R, C>>,
    verifier: Arc<TokenVerifier>,
}

impl<L, R, C> ApiState<L, R, C>
where
    L: ListRepository,
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates the API state.
    #[must_use]
    pub fn new(service: TaskOrderService<L, R, C>, verifier: TokenVerifier) -> Self {
        Self {
            service: Arc::new(service),
            verifier: Arc::new(verifier),
        }
    }
}

impl<L, R, C> Clone for ApiState<L, R, C>
where
    L: ListRepository,
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            verifier: Arc::clone(&self.verifier),
        }
    }
}

impl<L, R, C> FromRef<ApiState<L, R, C>> for Arc<TokenVerifier>
where
    L: ListRepository,
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    fn from_ref(state: &ApiState<L, R, C>) -> Self {
        Arc::clone(&state.verifier)
    }
}

impl<L, R, C> FromRef<ApiState<L, R, C>> for Arc<TaskOrderService<L, R, C>>
where
    L: ListRepository,
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    fn from_ref(state: &ApiState<L, R, C>) -> Self {
        Arc::clone(&state.service)
    }
}

type Service<L, R, C> = State<Arc<TaskOrderService<L, R, C>>>;

/// Builds the task API router.
pub fn router<L, R, C>(state: ApiState<L, R, C>) -> Router
where
    L: ListRepository + 'static,
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/reorder", put(reorder_tasks))
        .route("/api/tasks/sort", post(sort_tasks))
        .route("/api/tasks/move", post(move_task))
        .route("/api/tasks/completed", delete(clear_completed))
        .route("/api/tasks/{id}", put(update_task).delete(delete_task))
        .route("/api/lists", get(list_lists).post(create_list))
        .route("/api/lists/{id}", put(rename_list).delete(delete_list))
        .with_state(state)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn query<T>(params: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    params
        .map(|Query(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn path_id<T>(id: Result<Path<T>, PathRejection>) -> ApiResult<T> {
    id.map(|Path(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn pinned(request: ReorderRequest, expected_version: Option<u64>) -> ReorderRequest {
    match expected_version {
        Some(version) => request.expecting_version(ListVersion::new(version)),
        None => request,
    }
}

async fn list_tasks<L, R, C>(
    State(service): Service<L, R, C>,
    Caller(caller): Caller,
    params: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<TaskBody>>>
where
    L: ListRepository + 'static,
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let ListQuery { list } = query(params)?;
    let snapshot = service.load(list, caller).await?;
    Ok(Json(snapshot.tasks.iter().map(TaskBody::from).collect()))
}

async fn create_task<L, R, C>(
    State(service): Service<L, R, C>,
    Caller(caller): Caller,
    payload: Result<Json<CreateTaskBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskBody>)>
where
    L: ListRepository + 'static,
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let input = body(payload)?;
    let mut request = CreateTaskRequest::new(input.list, input.name).completed(input.completed);
    if let Some(id) = input.id {
        request = request.with_id(id);
    }
    if let Some(due_at) = input.due_date_time_iso {
        request = request.with_due_at(due_at);
    }

    let created = service.create_task(caller, request).await?;
    Ok((StatusCode::CREATED, Json(TaskBody::from(&created.task))))
}

async fn reorder_tasks<L, R, C>(
    State(service): Service<L, R, C>,
    Caller(caller): Caller,
    payload: Result<Json<ReorderBody>, JsonRejection>,
) -> ApiResult<Json<SnapshotBody>>
where
    L: ListRepository + 'static,
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let input = body(payload)?;
    let request = pinned(
        ReorderRequest::new(OrderOperation::Arrange {
            task_ids: input.ordered_task_ids,
        }),
        input.expected_version,
    );
    let snapshot = service.reorder(input.list, caller, request).await?;
    Ok(Json(SnapshotBody::from(&snapshot)))
}

async fn sort_tasks<L, R, C>(
    State(service): Service<L, R, C>,
    Caller(caller): Caller,
    payload: Result<Json<SortBody>, JsonRejection>,
) -> ApiResult<Json<SnapshotBody>>
where
    L: ListRepository + 'static,
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let input = body(payload)?;
    let request = pinned(
        ReorderRequest::new(OrderOperation::SortByPolicy),
        input.expected_version,
    );
    let snapshot = service.reorder(input.list, caller, request).await?;
    Ok(Json(SnapshotBody::from(&snapshot)))
}

async fn move_task<L, R, C>(
    State(service): Service<L, R, C>,
    Caller(caller): Caller,
    payload: Result<Json<MoveBody>, JsonRejection>,
) -> ApiResult<Json<SnapshotBody>>
where
    L: ListRepository + 'static,
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let input = body(payload)?;
    let operation = match input.target_id {
        Some(target) => OrderOperation::MoveToIndex {
            moved: input.moved_id,
            target,
        },
        None => OrderOperation::MoveToEnd {
            moved: input.moved_id,
        },
    };
    let request = pinned(ReorderRequest::new(operation), input.expected_version);
    let snapshot = service.reorder(input.list, caller, request).await?;
    Ok(Json(SnapshotBody::from(&snapshot)))
}

async fn update_task<L, R, C>(
    State(service): Service<L, R, C>,
    Caller(caller): Caller,
    id: Result<Path<TaskId>, PathRejection>,
    payload: Result<Json<UpdateTaskBody>, JsonRejection>,
) -> ApiResult<Json<TaskBody>>
where
    L: ListRepository + 'static,
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let task_id = path_id(id)?;
    let input = body(payload)?;
    let mut request = UpdateTaskRequest::new();
    if let Some(name) = input.name {
        request = request.rename(name);
    }
    if let Some(completed) = input.completed {
        request = request.completed(completed);
    }
    if let Some(due_at) = input.due_date_time_iso {
        request = request.due_at(due_at);
    }

    let task = service.update_task(caller, task_id, request).await?;
    Ok(Json(TaskBody::from(&task)))
}

async fn delete_task<L, R, C>(
    State(service): Service<L, R, C>,
    Caller(caller): Caller,
    id: Result<Path<TaskId>, PathRejection>,
) -> ApiResult<Json<SnapshotBody>>
where
    L: ListRepository + 'static,
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let task_id = path_id(id)?;
    let snapshot = service.delete_task(caller, task_id).await?;
    Ok(Json(SnapshotBody::from(&snapshot)))
}

async fn clear_completed<L, R, C>(
    State(service): Service<L, R, C>,
    Caller(caller): Caller,
    params: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<SnapshotBody>>
where
    L: ListRepository + 'static,
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let ListQuery { list } = query(params)?;
    let snapshot = service.clear_completed(list, caller).await?;
    Ok(Json(SnapshotBody::from(&snapshot)))
}

async fn list_lists<L, R, C>(
    State(service): Service<L, R, C>,
    Caller(caller): Caller,
) -> ApiResult<Json<Vec<ListBody>>>
where
    L: ListRepository + 'static,
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let lists = service.lists_for(caller).await?;
    Ok(Json(lists.iter().map(ListBody::from).collect()))
}

async fn create_list<L, R, C>(
    State(service): Service<L, R, C>,
    Caller(caller): Caller,
    payload: Result<Json<ListNameBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ListBody>)>
where
    L: ListRepository + 'static,
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let input = body(payload)?;
    let list = service.create_list(caller, &input.name).await?;
    Ok((StatusCode::CREATED, Json(ListBody::from(&list))))
}

async fn rename_list<L, R, C>(
    State(service): Service<L, R, C>,
    Caller(caller): Caller,
    id: Result<Path<ListId>, PathRejection>,
    payload: Result<Json<ListNameBody>, JsonRejection>,
) -> ApiResult<Json<ListBody>>
where
    L: ListRepository + 'static,
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let list_id = path_id(id)?;
    let input = body(payload)?;
    let list = service.rename_list(list_id, caller, &input.name).await?;
    Ok(Json(ListBody::from(&list)))
}

async fn delete_list<L, R, C>(
    State(service): Service<L, R, C>,
    Caller(caller): Caller,
    id: Result<Path<ListId>, PathRejection>,
) -> ApiResult<StatusCode>
where
    L: ListRepository + 'static,
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let list_id = path_id(id)?;
    service.delete_list(list_id, caller).await?;
    Ok(StatusCode::NO_CONTENT)
}
