//! Tasklist: multi-user task lists with a consistent, renumbered order.
//!
//! Each list holds an ordered sequence of tasks. Every structural change
//! (append, delete, move, sort, explicit arrangement) is computed by a pure
//! order engine and persisted as one atomic, version-guarded renumbering, so
//! a list of `n` tasks always holds exactly the orders `0..n`.
//!
//! # Architecture
//!
//! Tasklist follows hexagonal architecture principles:
//!
//! - **Domain**: tasks, lists and the order engine, free of I/O
//! - **Ports**: repository traits for lists and ordered tasks
//! - **Adapters**: in-memory and `PostgreSQL` stores, the axum HTTP API
//!
//! # Modules
//!
//! - [`task`]: domain, ports, adapters and the reconciliation service
//! - [`client`]: optimistic client cache, drag handling and view session
//! - [`config`]: environment-driven process configuration
//! - [`telemetry`]: tracing subscriber setup

pub mod client;
pub mod config;
pub mod task;
pub mod telemetry;
