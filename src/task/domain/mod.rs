//! Domain model for ordered task lists.
//!
//! The domain covers tasks, the lists that own them, and the order engine
//! that computes a list's sequence. Infrastructure concerns stay outside the
//! domain boundary.

mod error;
mod ids;
mod list;
pub mod order;
mod task;

pub use error::{OrderError, TaskDomainError};
pub use ids::{ListId, ListName, ListVersion, TaskId, TaskName, TaskOrder, UserId};
pub use list::TaskList;
pub use order::{OrderAssignment, OrderOperation};
pub use task::{NewTask, PersistedTaskData, Task, TaskSummary};
