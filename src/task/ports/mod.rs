//! Port contracts for ordered task lists.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod repository;

pub use repository::{
    ListCommit, ListRepository, TaskRepository, TaskRepositoryError, TaskRepositoryResult,
};
