//! Meetings and sprints.
//!
//! Neither has a backend table; they only live in the local store.

use serde::{Deserialize, Serialize};

use crate::entity::Identified;
use crate::fields::SprintStatus;
use crate::wire;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    #[serde(default, deserialize_with = "wire::string")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::string")]
    pub title: String,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Member ids.
    #[serde(default, deserialize_with = "wire::string_list")]
    pub attendees: Vec<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Identified for Meeting {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    #[serde(default, deserialize_with = "wire::string")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::string")]
    pub name: String,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "wire::string_list")]
    pub goals: Vec<String>,
    /// Task ids.
    #[serde(default, deserialize_with = "wire::string_list")]
    pub tasks: Vec<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(default, deserialize_with = "wire::opt")]
    pub status: Option<SprintStatus>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Identified for Sprint {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sprint_status_defaults_to_none_when_unrecognised() {
        let sprint: Sprint = serde_json::from_value(json!({
            "id": "s1",
            "name": "Sprint 1",
            "status": "paused",
            "goals": ["ship"]
        }))
        .unwrap();
        assert_eq!(sprint.status, None);
        assert_eq!(sprint.goals, vec!["ship"]);
    }
}
