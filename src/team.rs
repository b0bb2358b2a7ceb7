//! Team and user records.

use serde::{Deserialize, Serialize};

use crate::entity::{EntityKind, Identified, Remote};
use crate::wire;

/// Member entry embedded in a team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    #[serde(default, deserialize_with = "wire::string")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::string")]
    pub name: String,
    #[serde(default, deserialize_with = "wire::string")]
    pub email: String,
    #[serde(default, deserialize_with = "wire::string")]
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(default, deserialize_with = "wire::string")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::string")]
    pub name: String,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "wire::list")]
    pub members: Vec<TeamMember>,
    #[serde(default, deserialize_with = "wire::string_list")]
    pub projects: Vec<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Team {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn member(&self, id: &str) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.id == id)
    }
}

impl Identified for Team {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Remote for Team {
    const KIND: EntityKind = EntityKind::Team;
}

/// An account in the users table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, deserialize_with = "wire::string")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::string")]
    pub username: String,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// JSON-encoded list on the wire.
    #[serde(default, deserialize_with = "wire::string_list", serialize_with = "wire::json_string")]
    pub achievements: Vec<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Identified for User {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Remote for User {
    const KIND: EntityKind = EntityKind::User;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn members_accept_encoded_array_and_skip_junk() {
        let team: Team = serde_json::from_value(json!({
            "id": "team-1",
            "name": "Core",
            "members": "[{\"id\":\"u1\",\"name\":\"Ana\",\"email\":\"a@x.io\",\"role\":\"lead\"}, 5]",
            "projects": ["project-1"]
        }))
        .unwrap();
        assert_eq!(team.members.len(), 1);
        assert_eq!(team.member("u1").map(|m| m.role.as_str()), Some("lead"));
        assert_eq!(team.projects, vec!["project-1"]);
    }

    #[test]
    fn user_achievements_decode_from_json_string() {
        let user: User = serde_json::from_value(json!({
            "id": "user-1",
            "username": "ana",
            "achievements": "[\"first-task\"]"
        }))
        .unwrap();
        assert_eq!(user.achievements, vec!["first-task"]);
    }
}
