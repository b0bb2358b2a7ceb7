//! Typed service operations over the CRUD client.
//!
//! Each call formats a request body, performs one HTTP round trip, unwraps and
//! decodes the response, and returns a typed record. Errors are returned, never
//! panicked; wrap a result in [`crate::error::ServiceResponse`] for the
//! `{success, error}` shape.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::builder::{build_create_body, build_delete_body, build_update_body, to_fields};
use crate::client::CrudClient;
use crate::config::ClientConfig;
use crate::entity::{EntityKind, Remote};
use crate::envelope::unwrap_single;
use crate::error::{ApiError, Result};
use crate::project::{Project, ProjectPatch};
use crate::task::{Task, TaskPatch};
use crate::team::{Team, User};

/// Result of the two-phase subtask creation.
///
/// The child is always created first. Linking it into the parent's `subtasks`
/// is a second, independent write; if that fails the child still exists with
/// its `parentId` set and [`ApiService::link_subtask`] can be retried.
#[derive(Debug)]
pub struct SubtaskOutcome {
    pub task: Task,
    pub parent: Option<Task>,
    pub link_error: Option<ApiError>,
}

impl SubtaskOutcome {
    pub fn is_linked(&self) -> bool {
        self.link_error.is_none()
    }
}

/// Decode a record, tolerating anything the lenient field readers accept.
fn from_record<T: Remote>(record: Value) -> Result<T> {
    Ok(serde_json::from_value(record)?)
}

/// Overlay the sent updates on a local copy of the record.
pub fn merge_updates<T: Remote>(current: &T, updates: &Map<String, Value>) -> Result<T> {
    let mut fields = to_fields(current)?;
    for (key, value) in updates {
        fields.insert(key.clone(), value.clone());
    }
    from_record(Value::Object(fields))
}

pub struct ApiService {
    crud: CrudClient,
}

impl ApiService {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            crud: CrudClient::new(config)?,
        })
    }

    pub fn crud(&self) -> &CrudClient {
        &self.crud
    }

    // ==================== Generic operations ====================

    /// All records of a table. Records that cannot be read at all are skipped.
    pub async fn fetch_all<T: Remote>(&self) -> Result<Vec<T>> {
        let records = self.crud.list(T::KIND).await?;
        let total = records.len();
        let parsed: Vec<T> = records
            .into_iter()
            .filter_map(|record| match from_record::<T>(record) {
                Ok(r) => Some(r),
                Err(e) => {
                    tracing::warn!(kind = T::KIND.name(), error = %e, "skipping unreadable record");
                    None
                }
            })
            .collect();
        tracing::debug!(kind = T::KIND.name(), total, kept = parsed.len(), "fetched records");
        Ok(parsed)
    }

    pub async fn fetch_one<T: Remote>(&self, id: &str) -> Result<T> {
        let record = self.crud.get(T::KIND, id).await?;
        from_record(record)
    }

    /// Create a record. The id and timestamps are generated here; whatever the
    /// caller put in those fields is ignored.
    ///
    /// The server usually echoes the stored item. When the echo carries no id
    /// (a bare `{success: true}` for instance) the item that was sent is returned.
    pub async fn create<T: Remote>(&self, record: &T) -> Result<T> {
        let body = build_create_body(T::KIND, to_fields(record)?);
        let payload = self.crud.create(T::KIND, &body).await?;

        let echoed = unwrap_single(&payload)
            .ok()
            .filter(|v| v.get("id").and_then(Value::as_str).is_some_and(|id| !id.is_empty()));
        let created: T = match echoed {
            Some(record) => from_record(record)?,
            None => from_record(body["item"].clone())?,
        };
        tracing::info!(kind = T::KIND.name(), id = created.id(), "created record");
        Ok(created)
    }

    /// Send an update and return the filtered, coerced updates that went out.
    pub async fn update_fields(
        &self,
        kind: EntityKind,
        id: &str,
        fields: &Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        let body = build_update_body(kind, id, fields);
        self.crud.update(kind, id, &body).await?;
        match body.get("updates") {
            Some(Value::Object(updates)) => Ok(updates.clone()),
            _ => Ok(Map::new()),
        }
    }

    /// Update a record from a patch and return the local copy with the patch applied.
    pub async fn update<T: Remote, P: Serialize>(&self, current: &T, patch: &P) -> Result<T> {
        let fields = to_fields(patch)?;
        let updates = self.update_fields(T::KIND, current.id(), &fields).await?;
        merge_updates(current, &updates)
    }

    pub async fn delete(&self, kind: EntityKind, id: &str) -> Result<()> {
        let body = build_delete_body(kind, id);
        self.crud.delete(kind, id, &body).await?;
        tracing::info!(kind = kind.name(), id, "deleted record");
        Ok(())
    }

    // ==================== Tasks ====================

    pub async fn fetch_tasks(&self) -> Result<Vec<Task>> {
        self.fetch_all().await
    }

    pub async fn fetch_task(&self, id: &str) -> Result<Task> {
        self.fetch_one(id).await
    }

    pub async fn create_task(&self, task: &Task) -> Result<Task> {
        self.create(task).await
    }

    pub async fn update_task(&self, current: &Task, patch: &TaskPatch) -> Result<Task> {
        self.update(current, patch).await
    }

    pub async fn delete_task(&self, id: &str) -> Result<()> {
        self.delete(EntityKind::Task, id).await
    }

    /// Create `child` under `parent_id`, then add it to the parent's `subtasks`.
    ///
    /// Not atomic: the child exists as soon as phase one succeeds.
    pub async fn create_subtask(&self, parent_id: &str, child: &Task) -> Result<SubtaskOutcome> {
        let mut child = child.clone();
        child.parent_id = Some(parent_id.to_string());
        let task = self.create_task(&child).await?;

        match self.link_subtask(parent_id, &task.id).await {
            Ok(parent) => Ok(SubtaskOutcome {
                task,
                parent: Some(parent),
                link_error: None,
            }),
            Err(e) => {
                tracing::warn!(parent_id, child_id = %task.id, error = %e, "subtask created but parent not linked");
                Ok(SubtaskOutcome {
                    task,
                    parent: None,
                    link_error: Some(e),
                })
            }
        }
    }

    /// Re-read the parent and append `child_id` to its `subtasks` if missing.
    pub async fn link_subtask(&self, parent_id: &str, child_id: &str) -> Result<Task> {
        let parent = self.fetch_task(parent_id).await?;
        let mut subtasks = parent.subtasks.clone();
        if subtasks.iter().any(|id| id == child_id) {
            return Ok(parent);
        }
        subtasks.push(child_id.to_string());
        let patch = TaskPatch {
            subtasks: Some(subtasks),
            ..Default::default()
        };
        self.update_task(&parent, &patch).await
    }

    // ==================== Projects ====================

    pub async fn fetch_projects(&self) -> Result<Vec<Project>> {
        self.fetch_all().await
    }

    pub async fn fetch_project(&self, id: &str) -> Result<Project> {
        self.fetch_one(id).await
    }

    pub async fn create_project(&self, project: &Project) -> Result<Project> {
        self.create(project).await
    }

    pub async fn update_project(&self, current: &Project, patch: &ProjectPatch) -> Result<Project> {
        self.update(current, patch).await
    }

    pub async fn delete_project(&self, id: &str) -> Result<()> {
        self.delete(EntityKind::Project, id).await
    }

    // ==================== Teams ====================

    pub async fn fetch_teams(&self) -> Result<Vec<Team>> {
        self.fetch_all().await
    }

    pub async fn create_team(&self, team: &Team) -> Result<Team> {
        self.create(team).await
    }

    pub async fn update_team(&self, id: &str, fields: &Map<String, Value>) -> Result<Map<String, Value>> {
        self.update_fields(EntityKind::Team, id, fields).await
    }

    pub async fn delete_team(&self, id: &str) -> Result<()> {
        self.delete(EntityKind::Team, id).await
    }

    // ==================== Users ====================

    pub async fn fetch_users(&self) -> Result<Vec<User>> {
        self.fetch_all().await
    }

    pub async fn fetch_user(&self, id: &str) -> Result<User> {
        self.fetch_one(id).await
    }

    pub async fn create_user(&self, user: &User) -> Result<User> {
        self.create(user).await
    }

    pub async fn update_user(&self, id: &str, fields: &Map<String, Value>) -> Result<Map<String, Value>> {
        self.update_fields(EntityKind::User, id, fields).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<()> {
        self.delete(EntityKind::User, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::TaskStatus;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    async fn service(server: &MockServer) -> ApiService {
        ApiService::new(ClientConfig {
            crud_base_url: server.uri(),
            ..Default::default()
        })
        .unwrap()
    }

    /// Echo the posted item back inside `{item}`.
    fn echo_item(request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        ResponseTemplate::new(200).set_body_json(json!({"item": body["item"]}))
    }

    #[tokio::test]
    async fn create_task_generates_id_and_decodes_echo() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("tableName", "project-management-tasks"))
            .and(body_partial_json(json!({"item": {"title": "Fix bug", "project": "P"}})))
            .respond_with(echo_item)
            .expect(1)
            .mount(&server)
            .await;

        let svc = service(&server).await;
        let mut task = Task::new("Fix bug");
        task.project = Some("P".into());
        task.assignee = Some("A".into());
        task.id = "caller-id".into();

        let created = svc.create_task(&task).await.unwrap();
        assert_eq!(created.title, "Fix bug");
        let digits = created.id.strip_prefix("task-").unwrap();
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(created.created_at, created.updated_at);
    }

    #[tokio::test]
    async fn create_falls_back_to_sent_item_when_echo_has_no_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        let svc = service(&server).await;
        let created = svc.create_project(&Project::new("Apollo")).await.unwrap();
        assert!(created.id.starts_with("project-"));
        assert_eq!(created.name, "Apollo");
    }

    #[tokio::test]
    async fn fetch_tasks_decodes_attribute_values() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {
                        "id": {"S": "task-1"},
                        "title": {"S": "Ship"},
                        "status": {"S": "Overdue"},
                        "estimatedHours": {"N": "2.5"},
                        "progress": {"N": "abc"},
                        "subtasks": {"S": "[\"task-2\"]"}
                    }
                ]
            })))
            .mount(&server)
            .await;

        let svc = service(&server).await;
        let tasks = svc.fetch_tasks().await.unwrap();
        assert_eq!(tasks.len(), 1);
        let task = &tasks[0];
        assert_eq!(task.status, Some(TaskStatus::Overdue));
        assert_eq!(task.estimated_hours, Some(2.5));
        assert_eq!(task.progress, None);
        assert_eq!(task.subtasks, vec!["task-2"]);
    }

    #[tokio::test]
    async fn update_task_sends_keyed_envelope_and_merges_locally() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(query_param("id", "task-1"))
            .and(body_partial_json(json!({
                "key": {"id": "task-1"},
                "updates": {"status": "Completed", "progress": 100}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let svc = service(&server).await;
        let current = Task {
            id: "task-1".into(),
            ..Task::new("Ship")
        };
        let patch = TaskPatch {
            status: Some(TaskStatus::Completed),
            progress: Some(250.0),
            title: Some(String::new()),
            ..Default::default()
        };
        let updated = svc.update_task(&current, &patch).await.unwrap();
        assert_eq!(updated.title, "Ship");
        assert_eq!(updated.status, Some(TaskStatus::Completed));
        assert_eq!(updated.progress, Some(100.0));
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn subtask_is_linked_into_parent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"item": {"parentId": "task-1"}})))
            .respond_with(echo_item)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("id", "task-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "item": {"id": "task-1", "title": "Parent", "subtasks": "[\"task-0\"]"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(query_param("id", "task-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let svc = service(&server).await;
        let outcome = svc.create_subtask("task-1", &Task::new("Child")).await.unwrap();
        assert!(outcome.is_linked());
        assert_eq!(outcome.task.parent_id.as_deref(), Some("task-1"));
        let parent = outcome.parent.unwrap();
        assert_eq!(parent.subtasks, vec!["task-0".to_string(), outcome.task.id.clone()]);

        // The link write stores `subtasks` as a JSON string, same as on create.
        let requests = server.received_requests().await.unwrap();
        let put = requests
            .iter()
            .find(|r| r.method.as_str() == "PUT")
            .unwrap();
        let body: Value = serde_json::from_slice(&put.body).unwrap();
        let expected = serde_json::to_string(&["task-0", outcome.task.id.as_str()]).unwrap();
        assert_eq!(body["updates"]["subtasks"], json!(expected));
    }

    #[tokio::test]
    async fn task_patch_lists_go_out_in_wire_form() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(body_partial_json(json!({
                "key": {"id": "task-1"},
                "updates": {"tags": "api,backend", "subtasks": "[\"task-2\"]"}
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let svc = service(&server).await;
        let current = Task {
            id: "task-1".into(),
            ..Task::new("Ship")
        };
        let patch = TaskPatch {
            tags: Some(vec!["api".into(), "backend".into()]),
            subtasks: Some(vec!["task-2".into()]),
            ..Default::default()
        };
        let updated = svc.update_task(&current, &patch).await.unwrap();
        assert_eq!(updated.tags, vec!["api", "backend"]);
        assert_eq!(updated.subtasks, vec!["task-2"]);
    }

    #[tokio::test]
    async fn project_patch_budget_and_tags_match_create_shape() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(query_param("tableName", "project-management-projects"))
            .and(body_partial_json(json!({
                "key": {"id": "project-1"},
                "updates": {"budget": "1500", "tags": "[\"q3\"]", "tasks": "[]"}
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let svc = service(&server).await;
        let current = Project {
            id: "project-1".into(),
            ..Project::new("Apollo")
        };
        let patch = ProjectPatch {
            budget: Some(1500.0),
            tags: Some(vec!["q3".into()]),
            tasks: Some(Vec::new()),
            ..Default::default()
        };
        let updated = svc.update_project(&current, &patch).await.unwrap();
        assert_eq!(updated.budget.as_deref(), Some("1500"));
        assert_eq!(updated.tags, vec!["q3"]);
    }

    #[tokio::test]
    async fn create_user_posts_to_users_table() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("tableName", "project-management-users"))
            .and(body_partial_json(json!({"item": {"username": "ana", "achievements": "[]"}})))
            .respond_with(echo_item)
            .expect(1)
            .mount(&server)
            .await;

        let svc = service(&server).await;
        let user = User {
            username: "ana".into(),
            ..Default::default()
        };
        let created = svc.create_user(&user).await.unwrap();
        assert!(created.id.starts_with("user-"));
        assert_eq!(created.username, "ana");
    }

    #[tokio::test]
    async fn failed_link_still_returns_the_child() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(echo_item)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let svc = service(&server).await;
        let outcome = svc.create_subtask("task-1", &Task::new("Child")).await.unwrap();
        assert!(!outcome.is_linked());
        assert!(outcome.parent.is_none());
        assert!(matches!(outcome.link_error, Some(ApiError::Server { status: 503, .. })));
        assert_eq!(outcome.task.title, "Child");
    }

    #[tokio::test]
    async fn team_update_and_delete_use_bare_ids() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(body_partial_json(json!({"id": "team-1", "updates": {"name": "Core"}})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(body_partial_json(json!({"id": "team-1"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let svc = service(&server).await;
        let mut fields = Map::new();
        fields.insert("name".into(), json!("Core"));
        fields.insert("teamId".into(), json!("team-1"));
        let sent = svc.update_team("team-1", &fields).await.unwrap();
        assert!(!sent.contains_key("teamId"));
        svc.delete_team("team-1").await.unwrap();
    }

    #[test]
    fn merge_reads_back_json_encoded_lists() {
        let project = Project::new("Apollo");
        let mut updates = Map::new();
        updates.insert("tags".into(), json!("[\"a\",\"b\"]"));
        updates.insert("budget".into(), json!("900"));
        let merged = merge_updates(&project, &updates).unwrap();
        assert_eq!(merged.tags, vec!["a", "b"]);
        assert_eq!(merged.budget.as_deref(), Some("900"));
    }
}
