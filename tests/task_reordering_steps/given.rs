//! Given steps for task reordering BDD scenarios.

use super::world::{TaskReorderWorld, names, run_async};
use chrono::{Duration, Utc};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use tasklist::task::{
    domain::OrderOperation,
    services::{CreateTaskRequest, ReorderRequest, UpdateTaskRequest},
};

#[given(r#"a list with tasks "{tasks}""#)]
fn list_with_tasks(world: &mut TaskReorderWorld, tasks: String) -> Result<(), eyre::Report> {
    let list = run_async(world.service.create_list(world.owner, "Scenario"))
        .wrap_err("create scenario list")?;
    let mut version = list.version();
    for name in names(&tasks) {
        let created = run_async(
            world
                .service
                .create_task(world.owner, CreateTaskRequest::new(list.id(), name.as_str())),
        )
        .wrap_err_with(|| format!("create task {name}"))?;
        version = created.version;
        world.tasks_by_name.insert(name, created.task.id());
    }
    world.list_id = Some(list.id());
    world.seeded_version = Some(version);
    Ok(())
}

#[given(r#"task "{name}" is completed"#)]
fn task_is_completed(world: &mut TaskReorderWorld, name: String) -> Result<(), eyre::Report> {
    let task_id = world.task(&name)?;
    run_async(world.service.update_task(
        world.owner,
        task_id,
        UpdateTaskRequest::new().completed(true),
    ))
    .wrap_err("complete task")?;
    Ok(())
}

#[given(r#"task "{name}" is due in {days:i64} days"#)]
fn task_is_due(world: &mut TaskReorderWorld, name: String, days: i64) -> Result<(), eyre::Report> {
    let task_id = world.task(&name)?;
    let due = Utc::now() + Duration::days(days);
    run_async(world.service.update_task(
        world.owner,
        task_id,
        UpdateTaskRequest::new().due_at(Some(due)),
    ))
    .wrap_err("set due date")?;
    Ok(())
}

#[given(r#"another session moved task "{moved}" onto task "{target}""#)]
fn another_session_moved(
    world: &mut TaskReorderWorld,
    moved: String,
    target: String,
) -> Result<(), eyre::Report> {
    let operation = OrderOperation::MoveToIndex {
        moved: world.task(&moved)?,
        target: world.task(&target)?,
    };
    run_async(world.service.reorder(
        world.list_id()?,
        world.owner,
        ReorderRequest::new(operation),
    ))
    .wrap_err("concurrent move")?;
    Ok(())
}
