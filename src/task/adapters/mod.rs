//! Adapters implementing the task ports and exposing the task API.
//!
//! - [`memory::InMemoryTaskStore`]: lock-guarded in-memory storage
//! - [`postgres::PostgresTaskStore`]: `PostgreSQL` persistence using Diesel
//! - [`http`]: axum routes for the task and list API

pub mod http;
pub mod memory;
pub mod postgres;
