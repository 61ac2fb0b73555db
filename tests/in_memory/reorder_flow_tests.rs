//! End-to-end reorder flows against the in-memory store.

use crate::in_memory::helpers::{TestService, seed_list, service};
use rstest::rstest;
use tasklist::task::{
    domain::{ListVersion, OrderOperation},
    services::{ReorderRequest, RepairStrategy, UpdateTaskRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn every_write_leaves_a_contiguous_sequence(
    service: TestService,
) -> Result<(), eyre::Report> {
    let seeded = seed_list(&service, "Moving house", &["pack", "label", "load", "clean"]).await?;
    let [pack, label, load, clean] = seeded.ids[..] else {
        eyre::bail!("expected four seeded tasks");
    };

    service
        .reorder(
            seeded.list_id,
            seeded.owner,
            ReorderRequest::new(OrderOperation::MoveToIndex {
                moved: clean,
                target: pack,
            }),
        )
        .await?;
    service
        .update_task(seeded.owner, label, UpdateTaskRequest::new().completed(true))
        .await?;
    service.delete_task(seeded.owner, load).await?;
    let snapshot = service
        .reorder(
            seeded.list_id,
            seeded.owner,
            ReorderRequest::new(OrderOperation::SortByPolicy),
        )
        .await?;

    eyre::ensure!(
        snapshot.ids() == vec![clean, pack, label],
        "unexpected order {:?}",
        snapshot.ids()
    );
    for (index, task) in snapshot.tasks.iter().enumerate() {
        eyre::ensure!(
            usize::try_from(task.order().value())? == index,
            "task {} holds order {} at index {index}",
            task.id(),
            task.order()
        );
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn versions_count_structural_writes_only(service: TestService) -> Result<(), eyre::Report> {
    let seeded = seed_list(&service, "Garden", &["weed", "water"]).await?;
    let [weed, water] = seeded.ids[..] else {
        eyre::bail!("expected two seeded tasks");
    };

    service
        .update_task(seeded.owner, weed, UpdateTaskRequest::new().rename("weed beds"))
        .await?;
    let unchanged = service.load(seeded.list_id, seeded.owner).await?;
    eyre::ensure!(unchanged.version == ListVersion::new(2), "edit bumped the version");

    let moved = service
        .reorder(
            seeded.list_id,
            seeded.owner,
            ReorderRequest::new(OrderOperation::MoveToEnd { moved: weed })
                .expecting_version(unchanged.version),
        )
        .await?;
    eyre::ensure!(moved.version == ListVersion::new(3), "move did not bump the version");
    eyre::ensure!(moved.ids() == vec![water, weed], "move did not apply");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repair_is_a_no_op_on_healthy_lists(service: TestService) -> Result<(), eyre::Report> {
    let seeded = seed_list(&service, "Healthy", &["one", "two", "three"]).await?;

    let reports = service.repair_all(RepairStrategy::CurrentOrder).await?;

    eyre::ensure!(reports.len() == 1, "expected one report");
    eyre::ensure!(
        reports.iter().all(|report| !report.changed()),
        "healthy lists were rewritten"
    );
    let snapshot = service.load(seeded.list_id, seeded.owner).await?;
    eyre::ensure!(snapshot.ids() == seeded.ids, "repair changed the order");
    Ok(())
}
