//! Task data structure and related functionality.
//!
//! A `Task` is the decoded form of a row in the tasks table. Parent/child links
//! are kept on both sides: `parent_id` on the child and the `subtasks` id list
//! on the parent. The two are only eventually consistent.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entity::{EntityKind, Identified, Remote};
use crate::fields::{Priority, TaskStatus};
use crate::wire;

/// A unit of work tracked by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default, deserialize_with = "wire::string")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::string")]
    pub title: String,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, deserialize_with = "wire::opt", skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "wire::opt", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_f64", skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    /// Comma-joined on the wire.
    #[serde(default, deserialize_with = "wire::string_list", serialize_with = "wire::comma_joined")]
    pub tags: Vec<String>,
    /// JSON-encoded id array on the wire.
    #[serde(default, deserialize_with = "wire::string_list", serialize_with = "wire::json_string")]
    pub subtasks: Vec<String>,
    /// Comment count, stored as a string.
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_f64", skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Task {
            title: title.into(),
            status: Some(TaskStatus::ToDo),
            priority: Some(Priority::Medium),
            ..Default::default()
        }
    }

    /// Due date parsed from the leading `YYYY-MM-DD` of `dueDate`.
    pub fn due(&self) -> Option<NaiveDate> {
        let raw = self.due_date.as_deref()?;
        NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
    }

    /// Past due and not completed.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != Some(TaskStatus::Completed) && self.due().is_some_and(|d| d < today)
    }

    /// Record a child id once. Returns false if it was already listed.
    pub fn add_subtask(&mut self, child_id: &str) -> bool {
        if self.subtasks.iter().any(|id| id == child_id) {
            return false;
        }
        self.subtasks.push(child_id.to_string());
        true
    }
}

impl Identified for Task {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Remote for Task {
    const KIND: EntityKind = EntityKind::Task;
}

/// Partial update for a task. Unset fields are left alone by the backend.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "wire::opt_comma_joined")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "wire::opt_json_string")]
    pub subtasks: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_loose_backend_record() {
        let task: Task = serde_json::from_value(json!({
            "id": "task-1",
            "title": "Fix bug",
            "status": "In Progress",
            "priority": "High",
            "estimatedHours": "6",
            "tags": "backend,api",
            "subtasks": "[\"task-2\"]",
            "comments": 3,
            "progress": 40,
            "parentId": null,
            "dueDate": "2024-05-01T00:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(task.status, Some(TaskStatus::InProgress));
        assert_eq!(task.estimated_hours, Some(6.0));
        assert_eq!(task.tags, vec!["backend", "api"]);
        assert_eq!(task.subtasks, vec!["task-2"]);
        assert_eq!(task.comments.as_deref(), Some("3"));
        assert_eq!(task.parent_id, None);
        assert_eq!(task.due(), NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[test]
    fn unknown_status_degrades_to_none() {
        let task: Task = serde_json::from_value(json!({"id": "t", "title": "x", "status": "Blocked"})).unwrap();
        assert_eq!(task.status, None);
        assert_eq!(task.title, "x");
    }

    #[test]
    fn serializes_list_fields_in_wire_form() {
        let mut task = Task::new("Write docs");
        task.tags = vec!["docs".into(), "q3".into()];
        task.add_subtask("task-9");
        let v = serde_json::to_value(&task).unwrap();
        assert_eq!(v["tags"], json!("docs,q3"));
        assert_eq!(v["subtasks"], json!("[\"task-9\"]"));
        assert_eq!(v["status"], json!("To Do"));
        assert!(v.get("parentId").is_none());
    }

    #[test]
    fn add_subtask_is_idempotent() {
        let mut task = Task::new("parent");
        assert!(task.add_subtask("c1"));
        assert!(!task.add_subtask("c1"));
        assert_eq!(task.subtasks, vec!["c1"]);
    }

    #[test]
    fn overdue_ignores_completed_tasks() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut task = Task::new("late");
        task.due_date = Some("2024-05-01".into());
        assert!(task.is_overdue(today));
        task.status = Some(TaskStatus::Completed);
        assert!(!task.is_overdue(today));
    }
}
