//! Diesel row models for list and task persistence.

use super::schema::{task_lists, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning list identifier.
    pub list_id: uuid::Uuid,
    /// Task name.
    pub name: String,
    /// Completion flag.
    pub completed: bool,
    /// Optional due timestamp.
    pub due_at: Option<DateTime<Utc>>,
    /// Position within the list.
    pub position: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning list identifier.
    pub list_id: uuid::Uuid,
    /// Task name.
    pub name: String,
    /// Completion flag.
    pub completed: bool,
    /// Optional due timestamp.
    pub due_at: Option<DateTime<Utc>>,
    /// Position within the list.
    pub position: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset for task field edits; position is deliberately absent.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskFieldsChangeset {
    /// Task name.
    pub name: String,
    /// Completion flag.
    pub completed: bool,
    /// Optional due timestamp.
    pub due_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for task lists.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_lists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ListRow {
    /// List identifier.
    pub id: uuid::Uuid,
    /// Owning user identifier.
    pub owner_id: uuid::Uuid,
    /// List name.
    pub name: String,
    /// Sequence version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for task lists.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_lists)]
pub struct NewListRow {
    /// List identifier.
    pub id: uuid::Uuid,
    /// Owning user identifier.
    pub owner_id: uuid::Uuid,
    /// List name.
    pub name: String,
    /// Sequence version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
