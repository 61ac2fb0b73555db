//! Concurrent writers: version-guarded commits, retries and contention.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::task::{
    adapters::memory::InMemoryTaskStore,
    domain::{ListId, ListVersion, OrderOperation, Task, TaskId, UserId, order},
    ports::{
        ListCommit, ListRepository, TaskRepository, TaskRepositoryError, TaskRepositoryResult,
    },
    services::{
        CreateTaskRequest, ReorderPolicy, ReorderRequest, TaskOrderError, TaskOrderService,
    },
};
use async_trait::async_trait;
use mockable::DefaultClock;
use rstest::{fixture, rstest};

/// Store that lets another writer slip in before each of the next few
/// commits.
struct InterferingStore {
    inner: Arc<InMemoryTaskStore>,
    interferences: AtomicU32,
}

impl InterferingStore {
    fn new(inner: Arc<InMemoryTaskStore>) -> Self {
        Self {
            inner,
            interferences: AtomicU32::new(0),
        }
    }

    fn interfere(&self, times: u32) {
        self.interferences.store(times, Ordering::SeqCst);
    }

    async fn rival_commit(&self, list_id: ListId) -> TaskRepositoryResult<()> {
        let list = ListRepository::find_by_id(&*self.inner, list_id)
            .await?
            .ok_or(TaskRepositoryError::ListNotFound(list_id))?;
        let mut ids: Vec<TaskId> = self
            .inner
            .load_list(list_id)
            .await?
            .iter()
            .map(Task::id)
            .collect();
        ids.rotate_left(1);
        let assignments = order::renumber(&ids).map_err(TaskRepositoryError::persistence)?;
        let commit = ListCommit::new(list_id, list.version(), assignments);
        self.inner.commit(&commit).await.map(|_| ())
    }
}

#[async_trait]
impl TaskRepository for InterferingStore {
    async fn insert(
        &self,
        task: &Task,
        expected_version: ListVersion,
    ) -> TaskRepositoryResult<ListVersion> {
        self.inner.insert(task, expected_version).await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.inner.update(task).await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        TaskRepository::find_by_id(&*self.inner, id).await
    }

    async fn load_list(&self, list_id: ListId) -> TaskRepositoryResult<Vec<Task>> {
        self.inner.load_list(list_id).await
    }

    async fn commit(&self, commit: &ListCommit) -> TaskRepositoryResult<ListVersion> {
        let pending = self.interferences.load(Ordering::SeqCst);
        if pending > 0 {
            self.interferences.store(pending - 1, Ordering::SeqCst);
            self.rival_commit(commit.list_id).await?;
        }
        self.inner.commit(commit).await
    }
}

type ContendedService = TaskOrderService<InMemoryTaskStore, InterferingStore, DefaultClock>;
type TestService = TaskOrderService<InMemoryTaskStore, InMemoryTaskStore, DefaultClock>;

struct Contended {
    service: ContendedService,
    store: Arc<InterferingStore>,
    owner: UserId,
    list_id: ListId,
    ids: Vec<TaskId>,
}

#[fixture]
fn store() -> Arc<InMemoryTaskStore> {
    Arc::new(InMemoryTaskStore::new())
}

async fn seed_tasks(
    service: &TestService,
    owner: UserId,
    count: usize,
) -> (ListId, Vec<TaskId>) {
    let list = service
        .create_list(owner, "Shared")
        .await
        .expect("list creation should succeed");
    let mut ids = Vec::with_capacity(count);
    for index in 0..count {
        let created = service
            .create_task(
                owner,
                CreateTaskRequest::new(list.id(), format!("task {index}")),
            )
            .await
            .expect("task creation should succeed");
        ids.push(created.task.id());
    }
    (list.id(), ids)
}

async fn contended(store: Arc<InMemoryTaskStore>, attempts: u32) -> Contended {
    let plain = TaskOrderService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::new(DefaultClock),
    );
    let owner = UserId::new();
    let (list_id, ids) = seed_tasks(&plain, owner, 3).await;

    let interfering = Arc::new(InterferingStore::new(Arc::clone(&store)));
    let service = TaskOrderService::new(store, Arc::clone(&interfering), Arc::new(DefaultClock))
        .with_policy(ReorderPolicy::default().with_commit_attempts(attempts));
    Contended {
        service,
        store: interfering,
        owner,
        list_id,
        ids,
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_arrangements_leave_exactly_one_submitted_order(
    store: Arc<InMemoryTaskStore>,
) {
    let service: TestService = TaskOrderService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::new(DefaultClock),
    );
    let owner = UserId::new();
    let (list_id, ids) = seed_tasks(&service, owner, 4).await;
    let forward = ids.clone();
    let mut backward = ids.clone();
    backward.reverse();

    let first = {
        let svc = service.clone();
        let task_ids = backward.clone();
        tokio::spawn(async move {
            svc.reorder(
                list_id,
                owner,
                ReorderRequest::new(OrderOperation::Arrange { task_ids }),
            )
            .await
        })
    };
    let second = {
        let svc = service.clone();
        let mut task_ids = forward.clone();
        task_ids.rotate_left(2);
        tokio::spawn(async move {
            svc.reorder(
                list_id,
                owner,
                ReorderRequest::new(OrderOperation::Arrange { task_ids }),
            )
            .await
        })
    };
    let (first_result, second_result) = tokio::join!(first, second);
    first_result
        .expect("task should not panic")
        .expect("first reorder should commit");
    second_result
        .expect("task should not panic")
        .expect("second reorder should commit");

    let mut rotated = forward;
    rotated.rotate_left(2);
    let final_ids = service
        .load(list_id, owner)
        .await
        .expect("load should succeed")
        .ids();
    assert!(final_ids == backward || final_ids == rotated);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pinned_concurrent_writers_admit_exactly_one(store: Arc<InMemoryTaskStore>) {
    let service: TestService = TaskOrderService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::new(DefaultClock),
    );
    let owner = UserId::new();
    let (list_id, ids) = seed_tasks(&service, owner, 3).await;
    let pinned = ListVersion::new(3);
    let moved = ids[0];

    let requests = (0..3).map(|_| {
        let svc = service.clone();
        tokio::spawn(async move {
            svc.reorder(
                list_id,
                owner,
                ReorderRequest::new(OrderOperation::MoveToEnd { moved }).expecting_version(pinned),
            )
            .await
        })
    });
    let mut committed = 0;
    let mut stale = 0;
    for handle in requests.collect::<Vec<_>>() {
        match handle.await.expect("task should not panic") {
            Ok(_) => committed += 1,
            Err(TaskOrderError::StaleVersion { .. }) => stale += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(committed, 1);
    assert_eq!(stale, 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unpinned_commit_retries_on_fresh_state(store: Arc<InMemoryTaskStore>) {
    let ctx = contended(store, 3).await;
    ctx.store.interfere(1);
    let moved = ctx.ids[1];

    let snapshot = ctx
        .service
        .reorder(
            ctx.list_id,
            ctx.owner,
            ReorderRequest::new(OrderOperation::MoveToEnd { moved }),
        )
        .await
        .expect("retry should commit");

    assert_eq!(snapshot.ids().last(), Some(&moved));
    assert_eq!(snapshot.version, ListVersion::new(5));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn contention_gives_up_after_the_configured_attempts(store: Arc<InMemoryTaskStore>) {
    let ctx = contended(store, 2).await;
    ctx.store.interfere(2);

    let err = ctx
        .service
        .reorder(
            ctx.list_id,
            ctx.owner,
            ReorderRequest::new(OrderOperation::MoveToEnd { moved: ctx.ids[1] }),
        )
        .await
        .expect_err("contention should be reported");

    assert!(matches!(
        err,
        TaskOrderError::CommitContention { attempts: 2, .. }
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pinned_commit_does_not_retry(store: Arc<InMemoryTaskStore>) {
    let ctx = contended(store, 3).await;
    ctx.store.interfere(1);

    let err = ctx
        .service
        .reorder(
            ctx.list_id,
            ctx.owner,
            ReorderRequest::new(OrderOperation::MoveToEnd { moved: ctx.ids[0] })
                .expecting_version(ListVersion::new(3)),
        )
        .await
        .expect_err("pinned commits fail on interference");

    assert!(matches!(
        err,
        TaskOrderError::StaleVersion { actual, .. } if actual == ListVersion::new(4)
    ));
}
