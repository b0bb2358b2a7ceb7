//! Enumerations and field types shared by the entity records.
//!
//! Wire values are the human-readable strings the backend stores ("To Do",
//! "In Progress", ...). CLI values are kebab-case.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task workflow status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[serde(rename = "To Do", alias = "todo", alias = "ToDo")]
    ToDo,
    #[serde(rename = "In Progress", alias = "in-progress", alias = "InProgress")]
    InProgress,
    #[serde(rename = "Completed", alias = "completed", alias = "Done")]
    Completed,
    #[serde(rename = "Overdue", alias = "overdue")]
    Overdue,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Overdue => "Overdue",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority classification for tasks and projects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
pub enum Priority {
    #[serde(alias = "low")]
    Low,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "high")]
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Sort rank, most urgent first.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sprint lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SprintStatus {
    #[default]
    Planning,
    Active,
    Completed,
}

/// Sorting options for task lists.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortKey {
    Due,
    Priority,
    Id,
}

/// Format an optional priority for display.
pub fn format_priority(p: Option<Priority>) -> &'static str {
    p.map(|p| p.as_str()).unwrap_or("-")
}

/// Format an optional task status for display.
pub fn format_status(s: Option<TaskStatus>) -> &'static str {
    s.map(|s| s.as_str()).unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_status_uses_display_strings_on_the_wire() {
        assert_eq!(serde_json::to_value(TaskStatus::ToDo).unwrap(), json!("To Do"));
        assert_eq!(serde_json::to_value(TaskStatus::InProgress).unwrap(), json!("In Progress"));
        let parsed: TaskStatus = serde_json::from_value(json!("Completed")).unwrap();
        assert_eq!(parsed, TaskStatus::Completed);
        let parsed: TaskStatus = serde_json::from_value(json!("in-progress")).unwrap();
        assert_eq!(parsed, TaskStatus::InProgress);
    }

    #[test]
    fn priority_round_trips_and_ranks() {
        let parsed: Priority = serde_json::from_value(json!("high")).unwrap();
        assert_eq!(parsed, Priority::High);
        assert!(Priority::High.rank() < Priority::Low.rank());
        assert_eq!(format_priority(None), "-");
    }

    #[test]
    fn sprint_status_is_lowercase() {
        assert_eq!(serde_json::to_value(SprintStatus::Active).unwrap(), json!("active"));
    }
}
