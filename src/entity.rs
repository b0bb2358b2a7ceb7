//! Entity kinds known to the CRUD backend and the traits records implement.
//!
//! The backend is not consistent about envelope shapes across tables: teams
//! take a bare `id` next to their updates, while the other tables want a
//! `key` object. Those quirks live here so request builders can stay generic.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A record with a string identifier.
pub trait Identified {
    fn id(&self) -> &str;
}

/// A record persisted in one of the backend tables.
pub trait Remote: Identified + Serialize + DeserializeOwned {
    const KIND: EntityKind;
}

/// How a record id is placed in an update or delete body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStyle {
    /// `{"key": {"id": ...}}`
    Keyed,
    /// `{"id": ...}`
    Bare,
}

/// Backend tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Task,
    Project,
    Team,
    User,
}

impl EntityKind {
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Task => "task",
            EntityKind::Project => "project",
            EntityKind::Team => "team",
            EntityKind::User => "user",
        }
    }

    /// Prefix of generated ids, e.g. `task-1718000000000`.
    pub fn id_prefix(&self) -> &'static str {
        self.name()
    }

    /// Entity-specific id field that must never be sent as an update.
    pub fn id_alias(&self) -> &'static str {
        match self {
            EntityKind::Task => "taskId",
            EntityKind::Project => "projectId",
            EntityKind::Team => "teamId",
            EntityKind::User => "userId",
        }
    }

    pub fn default_table(&self) -> &'static str {
        match self {
            EntityKind::Task => "project-management-tasks",
            EntityKind::Project => "project-management-projects",
            EntityKind::Team => "project-management-teams",
            EntityKind::User => "project-management-users",
        }
    }

    pub fn update_key_style(&self) -> KeyStyle {
        match self {
            EntityKind::Team => KeyStyle::Bare,
            EntityKind::Task | EntityKind::Project | EntityKind::User => KeyStyle::Keyed,
        }
    }

    pub fn delete_key_style(&self) -> KeyStyle {
        match self {
            EntityKind::Task | EntityKind::Project => KeyStyle::Keyed,
            EntityKind::Team | EntityKind::User => KeyStyle::Bare,
        }
    }
}
