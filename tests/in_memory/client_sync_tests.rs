//! Two optimistic clients editing the same list.

use crate::in_memory::helpers::{TestService, seed_list, service};
use mockable::DefaultClock;
use rstest::rstest;
use std::sync::Arc;
use tasklist::client::{CacheError, CacheState, LocalGateway, SequenceCache, UserAction};
use tasklist::task::services::ErrorClass;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pinned_client_rolls_back_after_a_concurrent_move(
    service: TestService,
) -> Result<(), eyre::Report> {
    let seeded = seed_list(&service, "Shared", &["a", "b", "c"]).await?;
    let [a, b, c] = seeded.ids[..] else {
        eyre::bail!("expected three seeded tasks");
    };
    let gateway = Arc::new(LocalGateway::new(service.clone(), seeded.owner));
    let mut laptop =
        SequenceCache::new(Arc::clone(&gateway), Arc::new(DefaultClock), seeded.list_id)
            .with_version_pinning();
    let mut phone = SequenceCache::new(gateway, Arc::new(DefaultClock), seeded.list_id)
        .with_version_pinning();
    laptop.load().await?;
    phone.load().await?;

    phone
        .perform(UserAction::Move {
            moved: c,
            target: Some(a),
        })
        .await?;
    let outcome = laptop
        .perform(UserAction::Move {
            moved: a,
            target: None,
        })
        .await;

    eyre::ensure!(
        matches!(outcome, Err(CacheError::Gateway(_))),
        "stale move should fail, got {outcome:?}"
    );
    let notice = laptop
        .notice()
        .ok_or_else(|| eyre::eyre!("missing notice"))?;
    eyre::ensure!(notice.class() == ErrorClass::Conflict, "wrong notice class");
    eyre::ensure!(
        laptop.tasks().iter().map(|task| task.id()).eq([a, b, c]),
        "laptop did not roll back"
    );

    laptop.load().await?;
    let server = service.load(seeded.list_id, seeded.owner).await?;
    eyre::ensure!(
        laptop.state() == &CacheState::Ready(server.clone()),
        "reload did not converge"
    );
    eyre::ensure!(server.ids() == vec![c, a, b], "phone move was lost");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn last_writer_wins_without_pinning(service: TestService) -> Result<(), eyre::Report> {
    let seeded = seed_list(&service, "Shared", &["a", "b", "c"]).await?;
    let [a, b, c] = seeded.ids[..] else {
        eyre::bail!("expected three seeded tasks");
    };
    let gateway = Arc::new(LocalGateway::new(service.clone(), seeded.owner));
    let mut first =
        SequenceCache::new(Arc::clone(&gateway), Arc::new(DefaultClock), seeded.list_id);
    let mut second = SequenceCache::new(gateway, Arc::new(DefaultClock), seeded.list_id);
    first.load().await?;
    second.load().await?;

    first.perform(UserAction::Arrange(vec![b, a, c])).await?;
    second.perform(UserAction::Arrange(vec![c, b, a])).await?;

    let server = service.load(seeded.list_id, seeded.owner).await?;
    eyre::ensure!(server.ids() == vec![c, b, a], "last arrangement should win");
    eyre::ensure!(
        second.state() == &CacheState::Ready(server),
        "writer cache should match the server"
    );
    Ok(())
}
