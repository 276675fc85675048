use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use shell_core::DEFAULT_THEME;
use shell_engine::HostSettings;
use thiserror::Error;

use crate::LogDestination;

pub const CONFIG_FILENAME: &str = "shell_app.ron";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path:?}: {reason}")]
    Read { path: PathBuf, reason: String },
    #[error("failed to parse config from {path:?}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Run without a host shell: no persistence, no events, host calls fail.
    pub detached: bool,
    /// Directory holding the settings store. Defaults to `./data`.
    pub store_dir: Option<PathBuf>,
    pub store_namespace: String,
    pub default_theme: String,
    pub log_destination: LogDestination,
    pub log_level: String,
    /// Ask native prompts on the terminal instead of cancelling them.
    pub interactive_prompts: bool,
    pub host: HostConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub username: String,
    pub password: String,
    pub progress_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            detached: false,
            store_dir: None,
            store_namespace: "settings.json".to_string(),
            default_theme: DEFAULT_THEME.to_string(),
            log_destination: LogDestination::File,
            log_level: "info".to_string(),
            interactive_prompts: true,
            host: HostConfig::default(),
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        let defaults = HostSettings::default();
        Self {
            username: defaults.username,
            password: defaults.password,
            progress_delay_ms: defaults.progress_delay.as_millis() as u64,
        }
    }
}

impl AppConfig {
    /// Reads `path`. A missing file yields the defaults silently; an
    /// unreadable or malformed one yields the defaults plus the reason, to be
    /// logged once a logger is installed.
    pub fn load_or_default(path: &Path) -> (Self, Option<ConfigError>) {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return (Self::default(), None);
            }
            Err(err) => {
                let error = ConfigError::Read {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                };
                return (Self::default(), Some(error));
            }
        };

        match ron::from_str(&content) {
            Ok(config) => (config, None),
            Err(err) => {
                let error = ConfigError::Parse {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                };
                (Self::default(), Some(error))
            }
        }
    }

    pub fn store_dir(&self) -> PathBuf {
        self.store_dir.clone().unwrap_or_else(|| {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("data")
        })
    }

    pub fn level(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    pub fn host_settings(&self) -> HostSettings {
        HostSettings {
            username: self.host.username.clone(),
            password: self.host.password.clone(),
            progress_delay: Duration::from_millis(self.host.progress_delay_ms),
            ..HostSettings::default()
        }
    }
}
