//! Client configuration.

use crate::entity::EntityKind;

/// Backend table names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
    pub tasks: String,
    pub projects: String,
    pub teams: String,
    pub users: String,
}

impl Tables {
    pub fn for_kind(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Task => &self.tasks,
            EntityKind::Project => &self.projects,
            EntityKind::Team => &self.teams,
            EntityKind::User => &self.users,
        }
    }
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            tasks: EntityKind::Task.default_table().to_string(),
            projects: EntityKind::Project.default_table().to_string(),
            teams: EntityKind::Team.default_table().to_string(),
            users: EntityKind::User.default_table().to_string(),
        }
    }
}

/// Endpoints and transport settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the generic CRUD endpoint (`?tableName=` is appended)
    pub crud_base_url: String,
    /// Base URL of the auth service (`/login`, `/signup`, `/logout`)
    pub auth_base_url: String,
    /// Base URL of the notification gateway
    pub notify_base_url: String,
    /// Google Calendar v3 base URL
    pub calendar_base_url: String,
    /// Optional bearer token sent to the CRUD endpoint
    pub api_key: Option<String>,
    /// Request timeout in seconds; none by default
    pub timeout_secs: Option<u64>,
    pub tables: Tables,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            crud_base_url: "http://localhost:3000/crud".to_string(),
            auth_base_url: "http://localhost:3000/auth".to_string(),
            notify_base_url: "http://localhost:3000".to_string(),
            calendar_base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            api_key: None,
            timeout_secs: None,
            tables: Tables::default(),
        }
    }
}

/// Strip trailing slashes so paths can be appended with `/`.
pub fn trim_base(url: &str) -> &str {
    url.trim_end_matches('/')
}
