//! Domain-focused tests for task and list values.

use crate::task::domain::{
    ListId, ListName, ListVersion, NewTask, Task, TaskDomainError, TaskId, TaskList, TaskName,
    TaskOrder, UserId,
};
use chrono::{Duration, Utc};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

fn new_task(name: &str) -> NewTask {
    NewTask {
        id: TaskId::new(),
        list_id: ListId::new(),
        name: TaskName::new(name).expect("valid task name"),
        completed: false,
        due_at: None,
    }
}

#[rstest]
#[case("  Buy milk  ", "Buy milk")]
#[case("Call\tMum", "Call\tMum")]
fn task_name_is_trimmed(#[case] raw: &str, #[case] expected: &str) {
    let name = TaskName::new(raw).expect("valid task name");
    assert_eq!(name.as_str(), expected);
}

#[rstest]
#[case("")]
#[case("   ")]
fn blank_task_name_is_rejected(#[case] raw: &str) {
    assert_eq!(TaskName::new(raw), Err(TaskDomainError::EmptyTaskName));
}

#[rstest]
fn blank_list_name_is_rejected() {
    assert_eq!(ListName::new("\n"), Err(TaskDomainError::EmptyListName));
}

#[rstest]
fn task_names_fit_the_stored_column() {
    let longest = "é".repeat(TaskName::MAX_CHARS);
    assert!(TaskName::new(longest.as_str()).is_ok());
    assert_eq!(
        TaskName::new(format!("{longest}x")),
        Err(TaskDomainError::TaskNameTooLong {
            max: TaskName::MAX_CHARS
        })
    );
}

#[rstest]
fn list_names_fit_the_stored_column() {
    let padded = format!("  {}  ", "l".repeat(ListName::MAX_CHARS));
    assert!(ListName::new(padded).is_ok());
    assert_eq!(
        ListName::new("l".repeat(ListName::MAX_CHARS + 1)),
        Err(TaskDomainError::ListNameTooLong {
            max: ListName::MAX_CHARS
        })
    );
}

#[rstest]
fn order_from_index_accepts_column_range() {
    assert_eq!(TaskOrder::from_index(0), Ok(TaskOrder::new(0)));
    assert_eq!(TaskOrder::from_index(41), Ok(TaskOrder::new(41)));
}

#[rstest]
fn order_from_index_rejects_values_beyond_the_column() {
    let too_large = usize::try_from(i64::from(i32::MAX) + 1).expect("64-bit usize");
    assert_eq!(
        TaskOrder::from_index(too_large),
        Err(TaskDomainError::OrderOutOfRange(too_large))
    );
}

#[rstest]
fn list_version_advances_by_one() {
    assert_eq!(ListVersion::INITIAL.next(), ListVersion::new(1));
    assert_eq!(ListVersion::new(7).to_string(), "v7");
}

#[rstest]
fn new_list_starts_at_initial_version(clock: DefaultClock) {
    let owner = UserId::new();
    let mut list = TaskList::new(owner, ListName::new("Groceries").expect("valid"), &clock);

    assert!(list.is_owned_by(owner));
    assert!(!list.is_owned_by(UserId::new()));
    assert_eq!(list.version(), ListVersion::INITIAL);
    assert_eq!(list.bump_version(), ListVersion::new(1));
    assert_eq!(list.version(), ListVersion::new(1));
}

#[rstest]
fn new_task_sets_matching_timestamps(clock: DefaultClock) {
    let task = Task::new(new_task("Water plants"), TaskOrder::new(3), &clock);

    assert_eq!(task.order(), TaskOrder::new(3));
    assert_eq!(task.created_at(), task.updated_at());
    assert!(!task.completed());
    assert_eq!(task.due_at(), None);
}

#[rstest]
fn field_edits_never_move_the_task(clock: DefaultClock) {
    let mut task = Task::new(new_task("Draft report"), TaskOrder::new(2), &clock);
    let due = Utc::now() + Duration::hours(4);

    task.rename(TaskName::new("Final report").expect("valid"), &clock);
    task.set_completed(true, &clock);
    task.set_due_at(Some(due), &clock);

    assert_eq!(task.order(), TaskOrder::new(2));
    assert_eq!(task.name().as_str(), "Final report");
    assert!(task.completed());
    assert_eq!(task.due_at(), Some(due));
    assert!(task.updated_at() >= task.created_at());
}

#[rstest]
fn summary_projects_order_relevant_fields(clock: DefaultClock) {
    let due = Utc::now();
    let mut task = Task::new(new_task("Pay rent"), TaskOrder::new(0), &clock);
    task.set_due_at(Some(due), &clock);

    let summary = task.summary();
    assert_eq!(summary.id, task.id());
    assert!(!summary.completed);
    assert_eq!(summary.due_at, Some(due));
}

#[rstest]
fn identifiers_parse_from_their_display_form() {
    let id = TaskId::new();
    let parsed: TaskId = id.to_string().parse().expect("round trip");
    assert_eq!(parsed, id);
    assert!("not-a-uuid".parse::<ListId>().is_err());
}
