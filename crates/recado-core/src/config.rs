use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::types::MissedWindowPolicy;

/// Default cadence of the store poll, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
/// Default resolution of the fire-check tick, in seconds.
pub const DEFAULT_TICK_SECS: u64 = 1;

// File names under the storage directory.
pub const SCHEDULE_FILE: &str = "schedule.json";
pub const HISTORY_FILE: &str = "send_history.json";
pub const DAEMON_LOG_FILE: &str = "daemon.log";
pub const DAEMON_PID_FILE: &str = "daemon.pid";

/// Top-level config (recado.toml + RECADO_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecadoConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub sender: SenderConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Where the schedule slot, history ledger and daemon artifacts live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_dir")]
    pub dir: String,
}

impl StorageConfig {
    pub fn schedule_path(&self) -> PathBuf {
        PathBuf::from(&self.dir).join(SCHEDULE_FILE)
    }

    pub fn history_path(&self) -> PathBuf {
        PathBuf::from(&self.dir).join(HISTORY_FILE)
    }

    pub fn daemon_log_path(&self) -> PathBuf {
        PathBuf::from(&self.dir).join(DAEMON_LOG_FILE)
    }

    pub fn daemon_pid_path(&self) -> PathBuf {
        PathBuf::from(&self.dir).join(DAEMON_PID_FILE)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

/// Daemon loop timing and missed-window behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between store polls. Staleness after a save is bounded by this.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Seconds between fire-check ticks while an entry is armed.
    #[serde(default = "default_tick")]
    pub tick_secs: u64,
    /// What to do with an active entry whose target minute already passed.
    #[serde(default)]
    pub missed_window: MissedWindowPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            tick_secs: default_tick(),
            missed_window: MissedWindowPolicy::default(),
        }
    }
}

/// HTTP gateway that performs the actual message transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderConfig {
    /// Base URL of the gateway, without trailing slash.
    #[serde(default = "default_gateway_url")]
    pub url: String,
    /// Optional bearer token sent in the Authorization header.
    pub access_token: Option<String>,
    /// Request timeout. The engine blocks on the send for at most this long.
    #[serde(default = "default_send_timeout")]
    pub timeout_secs: u64,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            access_token: None,
            timeout_secs: default_send_timeout(),
        }
    }
}

/// Desktop notification settings. Failures never reach the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    /// Command invoked as `<command> <title> <body>`.
    #[serde(default = "default_notify_command")]
    pub command: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: default_notify_command(),
        }
    }
}

/// Pre-filled values the CLI uses when `--to` / `--message` are omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub recipient: String,
    #[serde(default = "default_message")]
    pub message: String,
    #[serde(default = "default_hour")]
    pub hour: u32,
    #[serde(default)]
    pub minute: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            recipient: String::new(),
            message: default_message(),
            hour: default_hour(),
            minute: 0,
        }
    }
}

fn bool_true() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}
fn default_tick() -> u64 {
    DEFAULT_TICK_SECS
}
fn default_gateway_url() -> String {
    "http://127.0.0.1:8350".to_string()
}
fn default_send_timeout() -> u64 {
    40
}
fn default_notify_command() -> String {
    "notify-send".to_string()
}
fn default_message() -> String {
    "Despierta, bro!".to_string()
}
fn default_hour() -> u32 {
    5
}
fn default_storage_dir() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.recado", home)
}

impl RecadoConfig {
    /// Load config from a TOML file with RECADO_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.recado/recado.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: RecadoConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("RECADO_").split("_"))
            .extract()
            .map_err(|e| crate::error::RecadoError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.recado/recado.toml", home)
}
