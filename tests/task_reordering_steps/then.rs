//! Then steps for task reordering BDD scenarios.

use super::world::{TaskReorderWorld, names, run_async};
use rstest_bdd_macros::then;
use tasklist::task::{
    domain::TaskOrder,
    services::{ErrorClass, TaskOrderError},
};

fn failure(world: &TaskReorderWorld) -> Result<&TaskOrderError, eyre::Report> {
    match world.last_result.as_ref() {
        Some(Err(err)) => Ok(err),
        Some(Ok(snapshot)) => Err(eyre::eyre!(
            "expected a failure, got order {:?}",
            snapshot.ids()
        )),
        None => Err(eyre::eyre!("missing request result")),
    }
}

fn expect_class(world: &TaskReorderWorld, expected: ErrorClass) -> Result<(), eyre::Report> {
    let err = failure(world)?;
    eyre::ensure!(err.class() == expected, "expected {expected:?}, got {err}");
    Ok(())
}

#[then(r#"the list order is "{order}""#)]
fn list_order_is(world: &TaskReorderWorld, order: String) -> Result<(), eyre::Report> {
    let expected = names(&order)
        .iter()
        .map(|name| world.task(name))
        .collect::<Result<Vec<_>, _>>()?;
    let snapshot = run_async(world.service.load(world.list_id()?, world.owner))?;
    eyre::ensure!(
        snapshot.ids() == expected,
        "expected {order}, got {:?}",
        snapshot.ids()
    );
    Ok(())
}

#[then("the task orders are contiguous")]
fn orders_are_contiguous(world: &TaskReorderWorld) -> Result<(), eyre::Report> {
    let snapshot = run_async(world.service.load(world.list_id()?, world.owner))?;
    for (index, task) in snapshot.tasks.iter().enumerate() {
        eyre::ensure!(
            TaskOrder::from_index(index)? == task.order(),
            "task {} holds order {} at index {index}",
            task.id(),
            task.order()
        );
    }
    Ok(())
}

#[then("the request fails with a conflict")]
fn fails_with_conflict(world: &TaskReorderWorld) -> Result<(), eyre::Report> {
    expect_class(world, ErrorClass::Conflict)?;
    eyre::ensure!(
        matches!(failure(world)?, TaskOrderError::StaleVersion { .. }),
        "expected a stale version"
    );
    Ok(())
}

#[then("the request fails with a validation error")]
fn fails_with_validation(world: &TaskReorderWorld) -> Result<(), eyre::Report> {
    expect_class(world, ErrorClass::Validation)
}

#[then("the request fails with an authorization error")]
fn fails_with_authorization(world: &TaskReorderWorld) -> Result<(), eyre::Report> {
    expect_class(world, ErrorClass::Authorization)
}
