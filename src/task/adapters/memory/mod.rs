//! In-memory adapters for ordered task lists.

mod store;

pub use store::InMemoryTaskStore;
