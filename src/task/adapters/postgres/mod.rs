//! `PostgreSQL` adapters for ordered task list persistence.

mod conversions;
mod models;
mod repository;
mod schema;

pub use repository::{PostgresTaskStore, TaskPgPool, connect_pool};
