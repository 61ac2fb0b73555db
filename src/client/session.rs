//! Per-session view settings.

use crate::task::domain::ListId;
use serde::{Deserialize, Serialize};

/// View settings kept for one client session.
///
/// Serialized with the `selectedListId` key so it can live in any key/value
/// session store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSession {
    #[serde(default)]
    selected_list_id: Option<ListId>,
}

impl ViewSession {
    /// Creates a session with nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the selected list.
    #[must_use]
    pub const fn selected_list_id(&self) -> Option<ListId> {
        self.selected_list_id
    }

    /// Selects a list.
    pub const fn select(&mut self, list_id: ListId) {
        self.selected_list_id = Some(list_id);
    }

    /// Clears the selection.
    pub const fn clear(&mut self) {
        self.selected_list_id = None;
    }

    /// Keeps the selection valid for the lists that exist now.
    ///
    /// A selection that no longer exists falls back to the first available
    /// list, or to nothing when there are no lists.
    pub fn reconcile(&mut self, available: &[ListId]) -> Option<ListId> {
        let still_there = self
            .selected_list_id
            .filter(|selected| available.contains(selected));
        self.selected_list_id = still_there.or_else(|| available.first().copied());
        self.selected_list_id
    }
}
