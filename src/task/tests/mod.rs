//! Unit tests for the task module.
//!
//! Tests are organised by layer: domain values and the order engine, the
//! in-memory store, the reconciliation service and the HTTP adapter.

mod concurrency_tests;
mod domain_tests;
