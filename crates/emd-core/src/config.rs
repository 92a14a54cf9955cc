use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_UNANSWERED_PATH: &str = "/api/unanswered";
pub const DEFAULT_TYPING_INTERVAL_MS: u64 = 25;
pub const DEFAULT_CATEGORY_SWITCH_DELAY_MS: u64 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable that overrides the backend URL from the config file.
pub const URL_ENV: &str = "EMD_CHAT_URL";

/// Name of the directory under the platform config dir.
pub const APP_DIR: &str = "emd-chat";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub base_url: Option<String>,
    pub unanswered_path: Option<String>,
    pub typing_interval_ms: Option<u64>,
    pub category_switch_delay_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    /// External speech-to-text program; its stdout is taken as the transcript.
    pub voice_command: Option<Vec<String>>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load from the platform config dir. The first run writes a filled-in
    /// `config.json` so the settings are there to edit.
    pub fn load_or_init() -> Result<Self, ConfigError> {
        Self::load_or_init_at(&Self::get_config_path()?)
    }

    pub fn load_or_init_at(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::load_from(path);
        }

        let config = Self::template();
        match config.save_to(path) {
            Ok(()) => info!(path = %path.display(), "wrote default config"),
            Err(e) => warn!(error = %e, "could not write default config"),
        }
        Ok(config)
    }

    /// Every setting spelled out with its default.
    pub fn template() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            unanswered_path: Some(DEFAULT_UNANSWERED_PATH.to_string()),
            typing_interval_ms: Some(DEFAULT_TYPING_INTERVAL_MS),
            category_switch_delay_ms: Some(DEFAULT_CATEGORY_SWITCH_DELAY_MS),
            request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
            voice_command: None,
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_err)?;
        Ok(())
    }

    /// Apply `EMD_CHAT_URL` if set; it wins over the file.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(URL_ENV) {
            if !url.trim().is_empty() {
                self.base_url = Some(url);
            }
        }
        self
    }

    pub fn base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn unanswered_path(&self) -> &str {
        self.unanswered_path
            .as_deref()
            .unwrap_or(DEFAULT_UNANSWERED_PATH)
    }

    pub fn typing_interval(&self) -> Duration {
        Duration::from_millis(self.typing_interval_ms.unwrap_or(DEFAULT_TYPING_INTERVAL_MS))
    }

    pub fn category_switch_delay(&self) -> Duration {
        Duration::from_millis(
            self.category_switch_delay_ms
                .unwrap_or(DEFAULT_CATEGORY_SWITCH_DELAY_MS),
        )
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join(APP_DIR))
    }

    fn get_config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}
