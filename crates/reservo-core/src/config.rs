//! Configuration resolution for Reservo.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (`<config dir>/reservo/settings.json`)
//! 3. Project config (`.reservo/settings.json`)
//! 4. Environment variables (highest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Complete Reservo configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub relay: RelayConfig,
}

/// Booking storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Path to the bookings database. Defaults to a per-user data file.
    pub database_path: Option<PathBuf>,
}

/// Confirmation email configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// API key for the email provider. When unset, emails run in demo mode
    /// (logged, not sent).
    pub api_key: Option<String>,
    /// Email API endpoint.
    pub endpoint: String,
    /// Sender address for confirmations.
    pub from: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.resend.com/emails".to_string(),
            from: "Reservo <noreply@resend.dev>".to_string(),
        }
    }
}

/// Notification relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Poll interval for the remote insert watcher, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
        }
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config(project_dir: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path()
        && global_path.exists()
    {
        let global = load_config_file(&global_path)?;
        merge_config(&mut config, global);
    }

    if let Some(dir) = project_dir {
        let project_path = dir.join(".reservo").join("settings.json");
        if project_path.exists() {
            let project = load_config_file(&project_path)?;
            merge_config(&mut config, project);
        }
    }

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("reservo").join("settings.json"))
}

/// Default bookings database path.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("reservo").join("bookings.db"))
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Failed to parse config file {}: {}",
            path.display(),
            e
        ))
    })
}

fn merge_config(base: &mut Config, overlay: Config) {
    if overlay.storage.database_path.is_some() {
        base.storage.database_path = overlay.storage.database_path;
    }
    if overlay.email.api_key.is_some() {
        base.email.api_key = overlay.email.api_key;
    }
    base.email.endpoint = overlay.email.endpoint;
    base.email.from = overlay.email.from;
    base.relay = overlay.relay;
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(val) = std::env::var("RESERVO_DB_PATH") {
        config.storage.database_path = Some(PathBuf::from(val));
    }
    if let Ok(val) = std::env::var("RESERVO_EMAIL_API_KEY").or_else(|_| std::env::var("RESEND_API_KEY")) {
        config.email.api_key = Some(val);
    }
    if let Ok(val) = std::env::var("RESERVO_EMAIL_FROM") {
        config.email.from = val;
    }
    if let Ok(val) = std::env::var("RESERVO_POLL_INTERVAL_MS")
        && let Ok(n) = val.parse()
    {
        config.relay.poll_interval_ms = n;
    }
}
