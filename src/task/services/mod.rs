//! Application services reconciling list ownership with persisted task order.

mod error;
mod ordering;
mod repair;
mod requests;

pub use error::{ErrorClass, TaskOrderError, TaskOrderResult};
pub use ordering::TaskOrderService;
pub use repair::{RepairReport, RepairStrategy};
pub use requests::{
    CreateTaskRequest, CreatedTask, ForeignIdPolicy, ListSnapshot, ParseForeignIdPolicyError,
    ReorderPolicy, ReorderRequest, UpdateTaskRequest,
};
