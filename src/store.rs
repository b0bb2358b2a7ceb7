//! In-memory mirror of server state.
//!
//! The store is a plain value updated by [`Store::dispatch`]. Every transition
//! is synchronous and total; network calls happen before an action is built.
//! The store is a cache with no expiry: records stay until an action replaces
//! or removes them.

use serde::Serialize;

use crate::entity::Identified;
use crate::project::Project;
use crate::schedule::{Meeting, Sprint};
use crate::task::Task;
use crate::team::Team;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub tasks: Vec<Task>,
    pub teams: Vec<Team>,
    pub projects: Vec<Project>,
    pub meetings: Vec<Meeting>,
    pub sprints: Vec<Sprint>,
    pub is_loading: bool,
}

/// State transitions.
///
/// `Add*` appends without checking ids; `Upsert*` is the idempotent form that
/// replaces a record with the same id or appends it.
#[derive(Debug, Clone)]
pub enum Action {
    AddTask(Task),
    UpsertTask(Task),
    UpdateTask(Task),
    DeleteTask(String),
    SetTasks(Vec<Task>),

    AddProject(Project),
    UpsertProject(Project),
    UpdateProject(Project),
    DeleteProject(String),
    SetProjects(Vec<Project>),

    AddTeam(Team),
    UpsertTeam(Team),
    UpdateTeam(Team),
    DeleteTeam(String),
    SetTeams(Vec<Team>),

    AddMeeting(Meeting),
    UpsertMeeting(Meeting),
    UpdateMeeting(Meeting),
    DeleteMeeting(String),

    AddSprint(Sprint),
    UpsertSprint(Sprint),
    UpdateSprint(Sprint),
    DeleteSprint(String),

    SetLoading(bool),
}

/// Replace the first record with the same id. No match leaves the list as is.
fn replace_first<T: Identified>(list: &mut [T], record: T) {
    if let Some(slot) = list.iter_mut().find(|r| r.id() == record.id()) {
        *slot = record;
    }
}

fn upsert<T: Identified>(list: &mut Vec<T>, record: T) {
    match list.iter_mut().find(|r| r.id() == record.id()) {
        Some(slot) => *slot = record,
        None => list.push(record),
    }
}

fn remove_all<T: Identified>(list: &mut Vec<T>, id: &str) {
    list.retain(|r| r.id() != id);
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one action.
    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::AddTask(t) => self.tasks.push(t),
            Action::UpsertTask(t) => upsert(&mut self.tasks, t),
            Action::UpdateTask(t) => replace_first(&mut self.tasks, t),
            Action::DeleteTask(id) => remove_all(&mut self.tasks, &id),
            Action::SetTasks(tasks) => self.tasks = tasks,

            Action::AddProject(p) => self.projects.push(p),
            Action::UpsertProject(p) => upsert(&mut self.projects, p),
            Action::UpdateProject(p) => replace_first(&mut self.projects, p),
            Action::DeleteProject(id) => remove_all(&mut self.projects, &id),
            Action::SetProjects(projects) => self.projects = projects,

            Action::AddTeam(t) => self.teams.push(t),
            Action::UpsertTeam(t) => upsert(&mut self.teams, t),
            Action::UpdateTeam(t) => replace_first(&mut self.teams, t),
            Action::DeleteTeam(id) => remove_all(&mut self.teams, &id),
            Action::SetTeams(teams) => self.teams = teams,

            Action::AddMeeting(m) => self.meetings.push(m),
            Action::UpsertMeeting(m) => upsert(&mut self.meetings, m),
            Action::UpdateMeeting(m) => replace_first(&mut self.meetings, m),
            Action::DeleteMeeting(id) => remove_all(&mut self.meetings, &id),

            Action::AddSprint(s) => self.sprints.push(s),
            Action::UpsertSprint(s) => upsert(&mut self.sprints, s),
            Action::UpdateSprint(s) => replace_first(&mut self.sprints, s),
            Action::DeleteSprint(id) => remove_all(&mut self.sprints, &id),

            Action::SetLoading(loading) => self.is_loading = loading,
        }
    }

    /// Reducer form: consume the state and return the next one.
    pub fn reduce(mut self, action: Action) -> Self {
        self.dispatch(action);
        self
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Direct children of a task, found through `parentId`.
    pub fn subtasks_of(&self, parent_id: &str) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.parent_id.as_deref() == Some(parent_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, title: &str) -> Task {
        Task {
            id: id.to_string(),
            ..Task::new(title)
        }
    }

    #[test]
    fn add_update_delete_task() {
        let mut store = Store::new();
        store.dispatch(Action::AddTask(task("t1", "Draft")));
        store.dispatch(Action::UpdateTask(task("t1", "Final")));
        assert_eq!(store.tasks.len(), 1);
        assert_eq!(store.tasks[0].title, "Final");

        store.dispatch(Action::DeleteTask("t1".into()));
        assert!(store.tasks.is_empty());
    }

    #[test]
    fn add_does_not_dedup_but_upsert_does() {
        let store = Store::new()
            .reduce(Action::AddTask(task("t1", "a")))
            .reduce(Action::AddTask(task("t1", "b")));
        assert_eq!(store.tasks.len(), 2);

        let store = Store::new()
            .reduce(Action::UpsertTask(task("t1", "a")))
            .reduce(Action::UpsertTask(task("t1", "b")))
            .reduce(Action::UpsertTask(task("t2", "c")));
        assert_eq!(store.tasks.len(), 2);
        assert_eq!(store.task("t1").map(|t| t.title.as_str()), Some("b"));
    }

    #[test]
    fn update_without_match_is_a_no_op() {
        let store = Store::new()
            .reduce(Action::AddTask(task("t1", "a")))
            .reduce(Action::UpdateTask(task("missing", "x")));
        assert_eq!(store.tasks, vec![task("t1", "a")]);
    }

    #[test]
    fn update_replaces_only_the_first_duplicate() {
        let store = Store::new()
            .reduce(Action::AddTask(task("t1", "a")))
            .reduce(Action::AddTask(task("t1", "b")))
            .reduce(Action::UpdateTask(task("t1", "c")));
        let titles: Vec<_> = store.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "b"]);
    }

    #[test]
    fn delete_removes_every_duplicate() {
        let store = Store::new()
            .reduce(Action::AddTask(task("t1", "a")))
            .reduce(Action::AddTask(task("t1", "b")))
            .reduce(Action::AddTask(task("t2", "c")))
            .reduce(Action::DeleteTask("t1".into()));
        assert_eq!(store.tasks, vec![task("t2", "c")]);
    }

    #[test]
    fn loading_flag_leaves_lists_alone() {
        let store = Store::new()
            .reduce(Action::AddTask(task("t1", "a")))
            .reduce(Action::SetLoading(true));
        assert!(store.is_loading);
        assert_eq!(store.tasks.len(), 1);
    }

    #[test]
    fn set_tasks_replaces_everything() {
        let store = Store::new()
            .reduce(Action::AddTask(task("t1", "a")))
            .reduce(Action::SetTasks(vec![task("t9", "z")]));
        assert_eq!(store.tasks, vec![task("t9", "z")]);
    }

    #[test]
    fn meetings_and_sprints_follow_the_same_rules() {
        let meeting = Meeting {
            id: "m1".into(),
            title: "Standup".into(),
            ..Default::default()
        };
        let sprint = Sprint {
            id: "s1".into(),
            name: "Sprint 1".into(),
            ..Default::default()
        };
        let store = Store::new()
            .reduce(Action::AddMeeting(meeting.clone()))
            .reduce(Action::AddSprint(sprint))
            .reduce(Action::UpdateMeeting(Meeting {
                title: "Retro".into(),
                ..meeting
            }))
            .reduce(Action::DeleteSprint("s1".into()));
        assert_eq!(store.meetings[0].title, "Retro");
        assert!(store.sprints.is_empty());
    }

    #[test]
    fn subtasks_found_by_parent_id() {
        let mut child = task("c1", "child");
        child.parent_id = Some("p1".into());
        let store = Store::new()
            .reduce(Action::AddTask(task("p1", "parent")))
            .reduce(Action::AddTask(child));
        let ids: Vec<_> = store.subtasks_of("p1").iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c1"]);
    }
}
