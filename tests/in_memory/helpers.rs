//! Shared fixtures for in-memory integration tests.

use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;
use tasklist::task::{
    adapters::memory::InMemoryTaskStore,
    domain::{ListId, TaskId, UserId},
    services::{CreateTaskRequest, TaskOrderService},
};

/// Service type wired to the in-memory store.
pub type TestService = TaskOrderService<InMemoryTaskStore, InMemoryTaskStore, DefaultClock>;

/// Provides a service over a fresh in-memory store.
#[fixture]
pub fn service() -> TestService {
    let store = Arc::new(InMemoryTaskStore::new());
    TaskOrderService::new(Arc::clone(&store), store, Arc::new(DefaultClock))
}

/// A list owned by `owner` with tasks created in order.
pub struct SeededList {
    /// Owner of the list.
    pub owner: UserId,
    /// The list.
    pub list_id: ListId,
    /// Task ids in creation order.
    pub ids: Vec<TaskId>,
}

/// Creates a list named `name` with one task per entry of `tasks`.
///
/// # Errors
///
/// Returns an error if list or task creation fails.
pub async fn seed_list(
    service: &TestService,
    name: &str,
    tasks: &[&str],
) -> Result<SeededList, eyre::Report> {
    let owner = UserId::new();
    let list = service.create_list(owner, name).await?;
    let mut ids = Vec::with_capacity(tasks.len());
    for task in tasks {
        let created = service
            .create_task(owner, CreateTaskRequest::new(list.id(), *task))
            .await?;
        ids.push(created.task.id());
    }
    Ok(SeededList {
        owner,
        list_id: list.id(),
        ids,
    })
}
