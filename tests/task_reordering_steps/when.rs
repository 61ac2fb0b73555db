//! When steps for task reordering BDD scenarios.

use super::world::{TaskReorderWorld, names, run_async};
use rstest_bdd_macros::when;
use tasklist::task::{
    domain::{OrderOperation, TaskId, UserId},
    services::ReorderRequest,
};

fn submit(
    world: &mut TaskReorderWorld,
    caller: UserId,
    request: ReorderRequest,
) -> Result<(), eyre::Report> {
    let list_id = world.list_id()?;
    world.last_result = Some(run_async(world.service.reorder(list_id, caller, request)));
    Ok(())
}

#[when(r#"task "{moved}" is moved onto task "{target}""#)]
fn move_onto(
    world: &mut TaskReorderWorld,
    moved: String,
    target: String,
) -> Result<(), eyre::Report> {
    let operation = OrderOperation::MoveToIndex {
        moved: world.task(&moved)?,
        target: world.task(&target)?,
    };
    let owner = world.owner;
    submit(world, owner, ReorderRequest::new(operation))
}

#[when(r#"another user moves task "{moved}" onto task "{target}""#)]
fn another_user_moves(
    world: &mut TaskReorderWorld,
    moved: String,
    target: String,
) -> Result<(), eyre::Report> {
    let operation = OrderOperation::MoveToIndex {
        moved: world.task(&moved)?,
        target: world.task(&target)?,
    };
    submit(world, UserId::new(), ReorderRequest::new(operation))
}

#[when(r#"task "{moved}" is moved to the end expecting the original version"#)]
fn move_to_end_pinned(world: &mut TaskReorderWorld, moved: String) -> Result<(), eyre::Report> {
    let version = world
        .seeded_version
        .ok_or_else(|| eyre::eyre!("missing seeded version"))?;
    let request = ReorderRequest::new(OrderOperation::MoveToEnd {
        moved: world.task(&moved)?,
    })
    .expecting_version(version);
    let owner = world.owner;
    submit(world, owner, request)
}

#[when(r#"task "{name}" is deleted"#)]
fn delete_task(world: &mut TaskReorderWorld, name: String) -> Result<(), eyre::Report> {
    let task_id = world.task(&name)?;
    world.last_result = Some(run_async(world.service.delete_task(world.owner, task_id)));
    Ok(())
}

#[when("the list is sorted")]
fn sort_list(world: &mut TaskReorderWorld) -> Result<(), eyre::Report> {
    let owner = world.owner;
    submit(world, owner, ReorderRequest::new(OrderOperation::SortByPolicy))
}

#[when(r#"the list is arranged as "{order}""#)]
fn arrange_list(world: &mut TaskReorderWorld, order: String) -> Result<(), eyre::Report> {
    let task_ids: Vec<TaskId> = names(&order)
        .iter()
        .map(|name| world.task(name).unwrap_or_else(|_| TaskId::new()))
        .collect();
    let owner = world.owner;
    submit(
        world,
        owner,
        ReorderRequest::new(OrderOperation::Arrange { task_ids }),
    )
}
