//! Command implementations for the CLI interface.
//!
//! Each handler performs its backend calls, mirrors the results into a local
//! [`Store`], and prints from there.

use chrono::{Local, NaiveDate, Utc};
use clap::Subcommand;
use clap_complete::{generate, Shell};
use serde_json::{Map, Value};

use pm_client::auth::AuthClient;
use pm_client::calendar::CalendarClient;
use pm_client::error::{ApiError, Result};
use pm_client::fields::{format_priority, format_status, Priority, SortKey, TaskStatus};
use pm_client::notify::{NotifyClient, NotifyPayload};
use pm_client::project::{Project, ProjectPatch};
use pm_client::service::ApiService;
use pm_client::store::{Action, Store};
use pm_client::task::{Task, TaskPatch};
use pm_client::team::Team;
use pm_client::tokens::TokenStore;

#[derive(Subcommand)]
pub enum Commands {
    /// Work with tasks.
    Tasks {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Work with projects.
    Projects {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Work with teams.
    Teams {
        #[command(subcommand)]
        action: TeamAction,
    },

    /// Work with users.
    Users {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Log in and store the returned tokens.
    Login {
        username: String,
        #[arg(long, env = "PM_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Register a new account.
    Signup {
        username: String,
        email: String,
        #[arg(long, env = "PM_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Revoke the stored refresh token and forget all tokens.
    Logout,

    /// Fire a notification trigger.
    Notify {
        trigger_id: String,
        /// Plain message body.
        #[arg(long, conflicts_with = "event", required_unless_present = "event")]
        message: Option<String>,
        /// Event body as a JSON object.
        #[arg(long)]
        event: Option<String>,
    },

    /// Google Calendar, using the stored access token.
    Calendar {
        #[command(subcommand)]
        action: CalendarAction,
    },

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// List tasks with optional filters.
    List {
        /// Include completed tasks.
        #[arg(long)]
        all: bool,
        #[arg(long, value_enum)]
        status: Option<TaskStatus>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long, value_enum, default_value_t = SortKey::Due)]
        sort: SortKey,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// View a single task and its subtasks.
    View { id: String },

    /// Create a task.
    Add {
        title: String,
        #[command(flatten)]
        fields: TaskFields,
    },

    /// Create a subtask and link it into its parent.
    Subtask {
        parent: String,
        title: String,
        #[command(flatten)]
        fields: TaskFields,
    },

    /// Add an existing task to its parent's subtask list.
    Link { parent: String, child: String },

    /// Update fields on a task.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
        /// Progress percentage, clamped to 0-100.
        #[arg(long)]
        progress: Option<f64>,
    },

    /// Delete a task.
    Delete { id: String },
}

/// Task fields shared by add and update.
#[derive(clap::Args, Default)]
pub struct TaskFields {
    #[arg(long)]
    pub desc: Option<String>,
    #[arg(long)]
    pub project: Option<String>,
    #[arg(long)]
    pub assignee: Option<String>,
    #[arg(long, value_enum)]
    pub status: Option<TaskStatus>,
    #[arg(long, value_enum)]
    pub priority: Option<Priority>,
    /// Due date, YYYY-MM-DD.
    #[arg(long)]
    pub due: Option<String>,
    /// Start date, YYYY-MM-DD.
    #[arg(long)]
    pub start: Option<String>,
    #[arg(long)]
    pub hours: Option<f64>,
    /// Comma-separated tags. May be repeated.
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    List,
    Add {
        name: String,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long)]
        team: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        progress: Option<f64>,
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum TeamAction {
    List,
    Add {
        name: String,
        #[arg(long)]
        desc: Option<String>,
    },
    Rename {
        id: String,
        name: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    List,
}

#[derive(Subcommand)]
pub enum CalendarAction {
    /// Show upcoming events.
    Events {
        #[arg(long, default_value = "primary")]
        calendar: String,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
}

/// Normalize a tag string by trimming, lowercasing, and replacing spaces with hyphens.
pub fn normalise_tag(s: &str) -> String {
    s.trim().to_lowercase().replace(' ', "-")
}

/// Split comma-separated tag strings and normalize each tag.
pub fn split_and_normalise_tags(inputs: &[String]) -> Vec<String> {
    let mut tags = Vec::new();
    for raw in inputs {
        for part in raw.split(',') {
            let tag = normalise_tag(part);
            if !tag.is_empty() {
                tags.push(tag);
            }
        }
    }
    tags.sort();
    tags.dedup();
    tags
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let delta = (d - today).num_days();
            if delta == 0 {
                "today".into()
            } else if delta == 1 {
                "tomorrow".into()
            } else if delta > 1 {
                format!("in {}d", delta)
            } else {
                format!("{}d late", -delta)
            }
        }
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Print tasks in a fixed-width table.
pub fn print_tasks(tasks: &[&Task]) {
    println!(
        "{:<20} {:<12} {:<7} {:<10} {:<14} {}",
        "ID", "Status", "Pri", "Due", "Project", "Title [tags]"
    );
    let today = Local::now().date_naive();
    for t in tasks {
        let tags = if t.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", t.tags.join(","))
        };
        let project = t.project.clone().unwrap_or_else(|| "-".into());
        println!(
            "{:<20} {:<12} {:<7} {:<10} {:<14} {}{}",
            truncate(&t.id, 20),
            format_status(t.status),
            format_priority(t.priority),
            format_due_relative(t.due(), today),
            truncate(&project, 14),
            t.title,
            tags
        );
    }
}

/// Filter and sort tasks for `tasks list`.
pub fn select_tasks<'a>(
    tasks: &'a [Task],
    all: bool,
    status: Option<TaskStatus>,
    priority: Option<Priority>,
    project: Option<&str>,
    assignee: Option<&str>,
    sort: SortKey,
) -> Vec<&'a Task> {
    let mut filtered: Vec<&Task> = tasks
        .iter()
        .filter(|t| all || status.is_some() || t.status != Some(TaskStatus::Completed))
        .filter(|t| status.map_or(true, |s| t.status == Some(s)))
        .filter(|t| priority.map_or(true, |p| t.priority == Some(p)))
        .filter(|t| project.map_or(true, |p| t.project.as_deref() == Some(p)))
        .filter(|t| assignee.map_or(true, |a| t.assignee.as_deref() == Some(a)))
        .collect();

    match sort {
        SortKey::Due => filtered.sort_by(|a, b| {
            (a.due().unwrap_or(NaiveDate::MAX), &a.id).cmp(&(b.due().unwrap_or(NaiveDate::MAX), &b.id))
        }),
        SortKey::Priority => filtered.sort_by(|a, b| {
            let rank = |t: &Task| t.priority.map_or(3, |p| p.rank());
            (rank(a), &a.id).cmp(&(rank(b), &b.id))
        }),
        SortKey::Id => filtered.sort_by(|a, b| a.id.cmp(&b.id)),
    }
    filtered
}

fn task_from_fields(title: String, fields: TaskFields) -> Task {
    let mut task = Task::new(title);
    task.description = fields.desc;
    task.project = fields.project.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
    task.assignee = fields.assignee;
    if fields.status.is_some() {
        task.status = fields.status;
    }
    if fields.priority.is_some() {
        task.priority = fields.priority;
    }
    task.due_date = fields.due;
    task.start_date = fields.start;
    task.estimated_hours = fields.hours;
    task.tags = split_and_normalise_tags(&fields.tags);
    task.progress = Some(0.0);
    task.comments = Some("0".into());
    task
}

pub async fn cmd_tasks(api: &ApiService, action: TaskAction) -> Result<()> {
    let mut store = Store::new();
    match action {
        TaskAction::List { all, status, priority, project, assignee, sort, limit } => {
            store.dispatch(Action::SetLoading(true));
            let tasks = api.fetch_tasks().await?;
            store.dispatch(Action::SetTasks(tasks));
            store.dispatch(Action::SetLoading(false));

            let mut rows = select_tasks(
                &store.tasks,
                all,
                status,
                priority,
                project.as_deref(),
                assignee.as_deref(),
                sort,
            );
            if let Some(n) = limit {
                rows.truncate(n);
            }
            print_tasks(&rows);
        }

        TaskAction::View { id } => {
            let tasks = api.fetch_tasks().await?;
            store.dispatch(Action::SetTasks(tasks));
            let task = store
                .task(&id)
                .ok_or_else(|| ApiError::NotFound(format!("task {id}")))?;
            println!("{}", serde_json::to_string_pretty(task)?);

            let mut children = store.subtasks_of(&id);
            for listed in &task.subtasks {
                if !children.iter().any(|c| &c.id == listed) {
                    if let Some(child) = store.task(listed) {
                        children.push(child);
                    }
                }
            }
            if !children.is_empty() {
                println!();
                print_tasks(&children);
            }
        }

        TaskAction::Add { title, fields } => {
            let task = api.create_task(&task_from_fields(title, fields)).await?;
            println!("Added task {}", task.id);
            store.dispatch(Action::AddTask(task));
        }

        TaskAction::Subtask { parent, title, fields } => {
            let outcome = api
                .create_subtask(&parent, &task_from_fields(title, fields))
                .await?;
            println!("Added subtask {} under {}", outcome.task.id, parent);
            if let Some(e) = &outcome.link_error {
                eprintln!(
                    "Warning: parent {} was not updated ({e}). Retry with `pmc tasks link {} {}`.",
                    parent, parent, outcome.task.id
                );
            }
        }

        TaskAction::Link { parent, child } => {
            let parent = api.link_subtask(&parent, &child).await?;
            println!("Linked {} under {} ({} subtasks)", child, parent.id, parent.subtasks.len());
        }

        TaskAction::Update { id, title, fields, progress } => {
            let current = api.fetch_task(&id).await?;
            store.dispatch(Action::AddTask(current.clone()));
            let patch = TaskPatch {
                title,
                description: fields.desc,
                project: fields.project,
                assignee: fields.assignee,
                status: fields.status,
                priority: fields.priority,
                due_date: fields.due,
                start_date: fields.start,
                estimated_hours: fields.hours,
                tags: (!fields.tags.is_empty()).then(|| split_and_normalise_tags(&fields.tags)),
                progress,
                ..Default::default()
            };
            let updated = api.update_task(&current, &patch).await?;
            store.dispatch(Action::UpdateTask(updated));
            println!("Updated task {}", id);
            if let Some(task) = store.task(&id) {
                print_tasks(&[task]);
            }
        }

        TaskAction::Delete { id } => {
            api.delete_task(&id).await?;
            store.dispatch(Action::DeleteTask(id.clone()));
            println!("Deleted task {}", id);
        }
    }
    Ok(())
}

pub async fn cmd_projects(api: &ApiService, action: ProjectAction) -> Result<()> {
    match action {
        ProjectAction::List => {
            let projects = api.fetch_projects().await?;
            println!("{:<22} {:<12} {:>5} {:<10} {}", "ID", "Status", "Prog", "Budget", "Name");
            for p in &projects {
                println!(
                    "{:<22} {:<12} {:>4}% {:<10} {}",
                    truncate(&p.id, 22),
                    truncate(p.status.as_deref().unwrap_or("-"), 12),
                    p.progress.unwrap_or(0.0).round(),
                    truncate(p.budget.as_deref().unwrap_or("-"), 10),
                    p.name
                );
            }
        }
        ProjectAction::Add { name, desc, company, budget, priority, team } => {
            let mut project = Project::new(name);
            project.description = desc;
            project.company = company;
            project.budget = budget.map(|b| b.to_string());
            project.priority = priority;
            project.team = team;
            let created = api.create_project(&project).await?;
            println!("Added project {}", created.id);
        }
        ProjectAction::Update { id, name, status, progress, budget, notes } => {
            let current = api.fetch_project(&id).await?;
            let patch = ProjectPatch {
                name,
                status,
                progress,
                budget,
                notes,
                ..Default::default()
            };
            api.update_project(&current, &patch).await?;
            println!("Updated project {}", id);
        }
        ProjectAction::Delete { id } => {
            api.delete_project(&id).await?;
            println!("Deleted project {}", id);
        }
    }
    Ok(())
}

pub async fn cmd_teams(api: &ApiService, action: TeamAction) -> Result<()> {
    match action {
        TeamAction::List => {
            for team in api.fetch_teams().await? {
                println!("{:<22} {:<20} {} members", truncate(&team.id, 22), team.name, team.members.len());
                for m in &team.members {
                    println!("    {:<20} {:<28} {}", m.name, m.email, m.role);
                }
            }
        }
        TeamAction::Add { name, desc } => {
            let mut team = Team::new(name);
            team.description = desc;
            let created = api.create_team(&team).await?;
            println!("Added team {}", created.id);
        }
        TeamAction::Rename { id, name } => {
            let mut fields = Map::new();
            fields.insert("name".into(), Value::String(name));
            api.update_team(&id, &fields).await?;
            println!("Renamed team {}", id);
        }
        TeamAction::Delete { id } => {
            api.delete_team(&id).await?;
            println!("Deleted team {}", id);
        }
    }
    Ok(())
}

pub async fn cmd_users(api: &ApiService, action: UserAction) -> Result<()> {
    let UserAction::List = action;
    for user in api.fetch_users().await? {
        println!(
            "{:<22} {:<16} {:<28} {}",
            truncate(&user.id, 22),
            user.username,
            user.email.as_deref().unwrap_or("-"),
            user.role.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub async fn cmd_login(auth: &AuthClient, store: &TokenStore, username: &str, password: &str) -> Result<()> {
    let tokens = auth.login(username, password).await?;
    store.save(&tokens)?;
    println!("Logged in as {}", username);
    Ok(())
}

pub async fn cmd_signup(auth: &AuthClient, username: &str, email: &str, password: &str) -> Result<()> {
    let reply = auth.signup(username, email, password).await?;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}

pub async fn cmd_logout(auth: &AuthClient, store: &TokenStore) -> Result<()> {
    match store.load()? {
        Some(tokens) => {
            auth.logout(&tokens.refresh_token).await?;
            store.clear()?;
            println!("Logged out");
        }
        None => println!("Not logged in"),
    }
    Ok(())
}

pub async fn cmd_notify(
    notify: &NotifyClient,
    trigger_id: &str,
    message: Option<String>,
    event: Option<String>,
) -> Result<()> {
    let payload = match (message, event) {
        (Some(message), _) => NotifyPayload::Message(message),
        (None, Some(event)) => NotifyPayload::Event(serde_json::from_str(&event)?),
        (None, None) => return Err(ApiError::Config("either --message or --event is required".into())),
    };
    let reply = notify.fire(trigger_id, &payload).await?;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}

pub async fn cmd_calendar(calendar: &CalendarClient, store: &TokenStore, action: CalendarAction) -> Result<()> {
    let CalendarAction::Events { calendar: calendar_id, limit } = action;
    let tokens = store
        .load()?
        .ok_or_else(|| ApiError::Auth("no stored access token, run `pmc login` first".into()))?;
    let events = calendar
        .list_events(&tokens.access_token, &calendar_id, Utc::now(), limit)
        .await?;
    for e in &events {
        let start = e
            .start
            .date_time
            .as_deref()
            .or(e.start.date.as_deref())
            .unwrap_or("-");
        println!("{:<26} {}", start, e.summary);
    }
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    let mut cmd = crate::cli::Cli::command();
    generate(shell, &mut cmd, "pmc", &mut std::io::stdout());
}
