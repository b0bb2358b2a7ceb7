//! Project records.
//!
//! Projects group tasks and carry a budget and progress figure. The backend
//! stores `tasks` and `tags` as JSON-encoded strings and `budget` as a string.

use serde::{Deserialize, Serialize};

use crate::entity::{EntityKind, Identified, Remote};
use crate::fields::Priority;
use crate::wire;

/// A project as stored by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, deserialize_with = "wire::string")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::string")]
    pub name: String,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "wire::opt", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_f64", skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, deserialize_with = "wire::string_list", serialize_with = "wire::json_string")]
    pub tasks: Vec<String>,
    #[serde(default, deserialize_with = "wire::string_list", serialize_with = "wire::json_string")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Project {
            name: name.into(),
            status: Some("Planning".to_string()),
            progress: Some(0.0),
            ..Default::default()
        }
    }
}

impl Identified for Project {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Remote for Project {
    const KIND: EntityKind = EntityKind::Project;
}

/// Partial update for a project.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "wire::opt_json_string")]
    pub tasks: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "wire::opt_json_string")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_numeric_budget_and_encoded_lists() {
        let project: Project = serde_json::from_value(json!({
            "id": "project-1",
            "name": "Apollo",
            "budget": 25000,
            "tasks": "[\"task-1\",\"task-2\"]",
            "tags": ["space"],
            "priority": "Low"
        }))
        .unwrap();
        assert_eq!(project.budget.as_deref(), Some("25000"));
        assert_eq!(project.tasks, vec!["task-1", "task-2"]);
        assert_eq!(project.tags, vec!["space"]);
        assert_eq!(project.priority, Some(Priority::Low));
    }

    #[test]
    fn list_fields_serialize_as_json_strings() {
        let mut project = Project::new("Apollo");
        project.tags = vec!["a".into(), "b".into()];
        let v = serde_json::to_value(&project).unwrap();
        assert_eq!(v["tags"], json!("[\"a\",\"b\"]"));
        assert_eq!(v["tasks"], json!("[]"));
    }
}
