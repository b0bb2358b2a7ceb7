//! # pmc - Project Management API client
//!
//! Command-line front end for the project-management backend: tasks,
//! projects, teams and users over the CRUD endpoint, plus login, notification
//! triggers and calendar events.
//!
//! ## Quick Start
//!
//! ```bash
//! export PM_CRUD_URL=https://api.example.com/crud
//!
//! # List open tasks, soonest due first
//! pmc tasks list
//!
//! # Add a task
//! pmc tasks add "Write release notes" --priority high --due 2024-06-01 --tag docs
//!
//! # Add a subtask under an existing task
//! pmc tasks subtask task-1717000000000 "Collect changelog entries"
//!
//! # Log in, then read upcoming calendar events
//! pmc login alice
//! pmc calendar events
//! ```
//!
//! Tokens are kept in `~/.pm/auth.json` (override with `--state-dir`).
//! Set `RUST_LOG=debug` to see every request.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pm_client::auth::AuthClient;
use pm_client::calendar::CalendarClient;
use pm_client::error::Result;
use pm_client::notify::NotifyClient;
use pm_client::service::ApiService;
use pm_client::tokens::TokenStore;

mod cli;
mod cmd;

use cli::Cli;
use cmd::*;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.client_config();
    let tokens = TokenStore::in_dir(&cli.state_dir());

    match cli.command {
        Commands::Tasks { action } => cmd_tasks(&ApiService::new(config)?, action).await,
        Commands::Projects { action } => cmd_projects(&ApiService::new(config)?, action).await,
        Commands::Teams { action } => cmd_teams(&ApiService::new(config)?, action).await,
        Commands::Users { action } => cmd_users(&ApiService::new(config)?, action).await,
        Commands::Login { username, password } => {
            cmd_login(&AuthClient::new(&config)?, &tokens, &username, &password).await
        }
        Commands::Signup { username, email, password } => {
            cmd_signup(&AuthClient::new(&config)?, &username, &email, &password).await
        }
        Commands::Logout => cmd_logout(&AuthClient::new(&config)?, &tokens).await,
        Commands::Notify { trigger_id, message, event } => {
            cmd_notify(&NotifyClient::new(&config)?, &trigger_id, message, event).await
        }
        Commands::Calendar { action } => cmd_calendar(&CalendarClient::new(&config)?, &tokens, action).await,
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}
