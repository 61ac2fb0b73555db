//! Drag-and-drop reordering of a list view.
//!
//! Drag-over events only move the dragged task inside a local preview. The
//! drop turns the preview into at most one [`UserAction::Arrange`].

use super::cache::UserAction;
use crate::task::domain::{OrderError, TaskId, TaskSummary, order};
use thiserror::Error;

/// Errors raised by [`DragSession`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DragError {
    /// A drag is already running.
    #[error("a drag is already in progress")]
    AlreadyDragging,
    /// No drag is running.
    #[error("no drag is in progress")]
    NotDragging,
    /// The dragged task is not in the view.
    #[error(transparent)]
    Order(#[from] OrderError),
}

/// State of a drag interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    /// A task is being dragged.
    Dragging {
        /// Task under the pointer.
        dragged: TaskId,
        /// Sequence when the drag started.
        origin: Vec<TaskId>,
        /// Sequence as currently previewed.
        preview: Vec<TaskId>,
    },
    /// The drag ended with a drop.
    Dropped {
        /// Sequence at the drop.
        sequence: Vec<TaskId>,
    },
}

/// Drag state machine: `Idle → Dragging → Dropped`.
#[derive(Debug, Clone, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    /// Creates an idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> &DragState {
        &self.state
    }

    /// Returns the previewed sequence while dragging.
    #[must_use]
    pub fn preview(&self) -> Option<&[TaskId]> {
        match &self.state {
            DragState::Dragging { preview, .. } => Some(preview),
            DragState::Idle | DragState::Dropped { .. } => None,
        }
    }

    /// Starts dragging `dragged` over the sequence `shown`.
    ///
    /// # Errors
    ///
    /// Returns [`DragError::AlreadyDragging`] during another drag and
    /// [`DragError::Order`] when `dragged` is not shown.
    pub fn start(&mut self, shown: &[TaskId], dragged: TaskId) -> Result<(), DragError> {
        if matches!(self.state, DragState::Dragging { .. }) {
            return Err(DragError::AlreadyDragging);
        }
        if !shown.contains(&dragged) {
            return Err(OrderError::UnknownTask(dragged).into());
        }
        self.state = DragState::Dragging {
            dragged,
            origin: shown.to_vec(),
            preview: shown.to_vec(),
        };
        Ok(())
    }

    /// Moves the dragged task into the slot of `target` in the preview.
    ///
    /// Hovering the dragged task over itself changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`DragError::NotDragging`] outside a drag and
    /// [`DragError::Order`] when `target` is not in the preview.
    pub fn hover(&mut self, target: TaskId) -> Result<(), DragError> {
        let DragState::Dragging {
            dragged, preview, ..
        } = &mut self.state
        else {
            return Err(DragError::NotDragging);
        };
        *preview = order::move_to_index(&summaries(preview), *dragged, target)?;
        Ok(())
    }

    /// Moves the dragged task to the end of the preview.
    ///
    /// # Errors
    ///
    /// Returns [`DragError::NotDragging`] outside a drag.
    pub fn hover_end(&mut self) -> Result<(), DragError> {
        let DragState::Dragging {
            dragged, preview, ..
        } = &mut self.state
        else {
            return Err(DragError::NotDragging);
        };
        *preview = order::move_to_end(&summaries(preview), *dragged)?;
        Ok(())
    }

    /// Ends the drag and returns the action to send, if the order changed.
    ///
    /// # Errors
    ///
    /// Returns [`DragError::NotDragging`] outside a drag.
    pub fn drop_here(&mut self) -> Result<Option<UserAction>, DragError> {
        if !matches!(self.state, DragState::Dragging { .. }) {
            return Err(DragError::NotDragging);
        }
        let DragState::Dragging {
            origin, preview, ..
        } = std::mem::take(&mut self.state)
        else {
            return Err(DragError::NotDragging);
        };
        let action = (preview != origin).then(|| UserAction::Arrange(preview.clone()));
        self.state = DragState::Dropped { sequence: preview };
        Ok(action)
    }

    /// Abandons the drag without sending anything.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}

fn summaries(ids: &[TaskId]) -> Vec<TaskSummary> {
    ids.iter().map(|id| TaskSummary::new(*id, false)).collect()
}
