//! Task list ownership record.

use super::{ListId, ListName, ListVersion, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A named list owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    id: ListId,
    owner: UserId,
    name: ListName,
    version: ListVersion,
    created_at: DateTime<Utc>,
}

impl TaskList {
    /// Creates an empty list owned by `owner`.
    #[must_use]
    pub fn new(owner: UserId, name: ListName, clock: &impl Clock) -> Self {
        Self {
            id: ListId::new(),
            owner,
            name,
            version: ListVersion::INITIAL,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a list from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: ListId,
        owner: UserId,
        name: ListName,
        version: ListVersion,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner,
            name,
            version,
            created_at,
        }
    }

    /// Returns the list identifier.
    #[must_use]
    pub const fn id(&self) -> ListId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the list name.
    #[must_use]
    pub const fn name(&self) -> &ListName {
        &self.name
    }

    /// Returns the current sequence version.
    #[must_use]
    pub const fn version(&self) -> ListVersion {
        self.version
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns whether `user` owns this list.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner == user
    }

    /// Renames the list. The sequence version is unchanged.
    pub fn rename(&mut self, name: ListName) {
        self.name = name;
    }

    /// Advances the sequence version after a structural change.
    pub const fn bump_version(&mut self) -> ListVersion {
        self.version = self.version.next();
        self.version
    }
}
