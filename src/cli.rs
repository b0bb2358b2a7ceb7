use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use pm_client::config::ClientConfig;

/// Command-line client for the project-management backend.
/// Endpoints come from flags or the matching PM_* environment variables.
#[derive(Parser)]
#[command(name = "pmc", version, about = "Project management API client")]
pub struct Cli {
    /// Base URL of the CRUD endpoint.
    #[arg(long, global = true, env = "PM_CRUD_URL")]
    pub crud_url: Option<String>,

    /// Base URL of the auth service.
    #[arg(long, global = true, env = "PM_AUTH_URL")]
    pub auth_url: Option<String>,

    /// Base URL of the notification gateway.
    #[arg(long, global = true, env = "PM_NOTIFY_URL")]
    pub notify_url: Option<String>,

    /// Google Calendar API base URL.
    #[arg(long, global = true, env = "PM_CALENDAR_URL")]
    pub calendar_url: Option<String>,

    /// Bearer token for the CRUD endpoint.
    #[arg(long, global = true, env = "PM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds. No timeout when unset.
    #[arg(long, global = true, env = "PM_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Directory holding auth.json. Defaults to ~/.pm.
    #[arg(long, global = true, env = "PM_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::default();
        if let Some(url) = &self.crud_url {
            config.crud_base_url = url.clone();
        }
        if let Some(url) = &self.auth_url {
            config.auth_base_url = url.clone();
        }
        if let Some(url) = &self.notify_url {
            config.notify_base_url = url.clone();
        }
        if let Some(url) = &self.calendar_url {
            config.calendar_base_url = url.clone();
        }
        config.api_key = self.api_key.clone();
        config.timeout_secs = self.timeout_secs;
        config
    }

    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".pm")
        })
    }
}
