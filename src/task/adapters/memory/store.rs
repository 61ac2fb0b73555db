//! In-memory list and task store for tests and database-less deployments.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{ListId, ListName, ListVersion, Task, TaskId, TaskList, UserId},
    ports::{
        ListCommit, ListRepository, TaskRepository, TaskRepositoryError, TaskRepositoryResult,
    },
};

/// Thread-safe in-memory store implementing both repository ports.
///
/// Every write happens under a single lock, so a [`ListCommit`] is applied
/// entirely or not at all.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<InMemoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    lists: HashMap<ListId, TaskList>,
    tasks: HashMap<TaskId, Task>,
}

impl InMemoryTaskStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

impl InMemoryState {
    fn list_mut(&mut self, list_id: ListId) -> TaskRepositoryResult<&mut TaskList> {
        self.lists
            .get_mut(&list_id)
            .ok_or(TaskRepositoryError::ListNotFound(list_id))
    }

    fn ordered_tasks(&self, list_id: ListId) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .values()
            .filter(|task| task.list_id() == list_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (task.order(), task.created_at(), task.id()));
        tasks
    }

    fn member_ids(&self, list_id: ListId) -> HashSet<TaskId> {
        self.tasks
            .values()
            .filter(|task| task.list_id() == list_id)
            .map(Task::id)
            .collect()
    }
}

fn check_version(list: &TaskList, expected: ListVersion) -> TaskRepositoryResult<()> {
    if list.version() != expected {
        return Err(TaskRepositoryError::VersionConflict {
            list_id: list.id(),
            expected,
            actual: list.version(),
        });
    }
    Ok(())
}

#[async_trait]
impl ListRepository for InMemoryTaskStore {
    async fn store(&self, list: &TaskList) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.lists.contains_key(&list.id()) {
            return Err(TaskRepositoryError::DuplicateList(list.id()));
        }
        state.lists.insert(list.id(), list.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ListId) -> TaskRepositoryResult<Option<TaskList>> {
        let state = self.read()?;
        Ok(state.lists.get(&id).cloned())
    }

    async fn find_by_owner(&self, owner: UserId) -> TaskRepositoryResult<Vec<TaskList>> {
        let state = self.read()?;
        let mut lists: Vec<TaskList> = state
            .lists
            .values()
            .filter(|list| list.is_owned_by(owner))
            .cloned()
            .collect();
        lists.sort_by_key(|list| (list.created_at(), list.id()));
        Ok(lists)
    }

    async fn list_ids(&self) -> TaskRepositoryResult<Vec<ListId>> {
        let state = self.read()?;
        let mut ids: Vec<ListId> = state.lists.keys().copied().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn rename(&self, id: ListId, name: &ListName) -> TaskRepositoryResult<TaskList> {
        let mut state = self.write()?;
        let list = state.list_mut(id)?;
        list.rename(name.clone());
        Ok(list.clone())
    }

    async fn delete(&self, id: ListId) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.lists.remove(&id).is_none() {
            return Err(TaskRepositoryError::ListNotFound(id));
        }
        state.tasks.retain(|_, task| task.list_id() != id);
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskStore {
    async fn insert(
        &self,
        task: &Task,
        expected_version: ListVersion,
    ) -> TaskRepositoryResult<ListVersion> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }

        let list = state.list_mut(task.list_id())?;
        check_version(list, expected_version)?;
        let version = list.bump_version();
        state.tasks.insert(task.id(), task.clone());
        Ok(version)
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::TaskNotFound(task.id()))?;

        // Field edits never move a task; keep the stored position.
        let order = stored.order();
        let mut updated = task.clone();
        updated.reposition(order);
        *stored = updated;
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn load_list(&self, list_id: ListId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(state.ordered_tasks(list_id))
    }

    async fn commit(&self, commit: &ListCommit) -> TaskRepositoryResult<ListVersion> {
        let mut state = self.write()?;
        let list = state.list_mut(commit.list_id)?;
        check_version(list, commit.expected_version)?;

        let members = state.member_ids(commit.list_id);
        commit.validate_against(&members)?;

        for task_id in &commit.removed {
            state.tasks.remove(task_id);
        }
        for assignment in &commit.assignments {
            if let Some(task) = state.tasks.get_mut(&assignment.task_id) {
                task.reposition(assignment.order);
            }
        }
        state.list_mut(commit.list_id).map(TaskList::bump_version)
    }
}
