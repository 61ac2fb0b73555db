//! Shared world state for task reordering BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use tasklist::task::{
    adapters::memory::InMemoryTaskStore,
    domain::{ListId, ListVersion, TaskId, UserId},
    services::{ListSnapshot, TaskOrderError, TaskOrderService},
};

/// Service type used by the BDD world.
pub type TestOrderService = TaskOrderService<InMemoryTaskStore, InMemoryTaskStore, DefaultClock>;

/// Scenario world for task reordering behaviour tests.
pub struct TaskReorderWorld {
    pub service: TestOrderService,
    pub owner: UserId,
    pub list_id: Option<ListId>,
    pub tasks_by_name: HashMap<String, TaskId>,
    pub seeded_version: Option<ListVersion>,
    pub last_result: Option<Result<ListSnapshot, TaskOrderError>>,
}

impl TaskReorderWorld {
    /// Creates a world with an empty store.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryTaskStore::new());
        Self {
            service: TaskOrderService::new(Arc::clone(&store), store, Arc::new(DefaultClock)),
            owner: UserId::new(),
            list_id: None,
            tasks_by_name: HashMap::new(),
            seeded_version: None,
            last_result: None,
        }
    }

    /// Returns the scenario's list.
    ///
    /// # Errors
    ///
    /// Returns an error when no list has been created yet.
    pub fn list_id(&self) -> Result<ListId, eyre::Report> {
        self.list_id
            .ok_or_else(|| eyre::eyre!("missing list in scenario world"))
    }

    /// Resolves a task name used in the feature file.
    ///
    /// # Errors
    ///
    /// Returns an error when the name was never seeded.
    pub fn task(&self, name: &str) -> Result<TaskId, eyre::Report> {
        self.tasks_by_name
            .get(name)
            .copied()
            .ok_or_else(|| eyre::eyre!("unknown task name {name}"))
    }
}

impl Default for TaskReorderWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits a comma-separated list of task names.
pub fn names(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskReorderWorld {
    TaskReorderWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
