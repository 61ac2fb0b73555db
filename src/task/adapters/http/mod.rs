//! HTTP surface of the task service.
//!
//! Every route requires an `Authorization: Bearer` token; see
//! [`TokenVerifier`]. Access to another user's list answers 404, exactly
//! like a missing list.

mod auth;
mod dto;
mod error;
mod routes;

pub use auth::{AccessClaims, AuthError, Caller, TokenVerifier};
pub use dto::{
    CreateTaskBody, ListBody, ListNameBody, ListQuery, MoveBody, ReorderBody, SnapshotBody,
    SortBody, TaskBody, UpdateTaskBody,
};
pub use error::{ApiError, ApiResult};
pub use routes::{ApiState, router};
