//! Client-side view of task lists.
//!
//! - [`SequenceCache`]: optimistic mirror of one list, reconciled against
//!   the service through a [`TaskGateway`]
//! - [`DragSession`]: drag-and-drop preview that sends one request per drop
//! - [`ViewSession`]: per-session selection of the list being viewed
//! - [`ProgressSummary`]: completion counts for a list header

mod cache;
mod drag;
mod gateway;
mod progress;
mod session;

pub use cache::{
    CacheError, CacheState, Confirmation, Notice, PendingRequest, SequenceCache, UserAction,
};
pub use drag::{DragError, DragSession, DragState};
pub use gateway::{GatewayError, GatewayResult, LocalGateway, TaskGateway};
pub use progress::ProgressSummary;
pub use session::ViewSession;

#[cfg(test)]
mod tests;
