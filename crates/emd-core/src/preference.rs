//! Persisted dark/light display preference.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::config::Config;
use crate::error::PreferenceError;

#[derive(Serialize, Deserialize, Default)]
struct StoredPreferences {
    #[serde(rename = "darkMode", default)]
    dark_mode: bool,
}

/// Display theme derived from the preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark_mode(dark_mode: bool) -> Self {
        if dark_mode {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Value of the display attribute a renderer applies.
    pub fn attribute(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

pub struct PreferenceStore {
    path: PathBuf,
    dark_mode: bool,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dark_mode: false,
        }
    }

    /// Store backed by `preferences.json` next to the config file.
    pub fn in_config_dir() -> Result<Self, PreferenceError> {
        let dir = Config::config_dir().map_err(|_| PreferenceError::NoConfigDir)?;
        Ok(Self::new(dir.join("preferences.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored value. Unset or unreadable means light mode.
    pub fn load(&mut self) -> bool {
        self.dark_mode = match self.read() {
            Ok(stored) => stored.dark_mode,
            Err(e) => {
                warn!(error = %e, "using default display preference");
                false
            }
        };
        self.dark_mode
    }

    /// Flip the preference and persist it. The in-memory value flips even
    /// when the write fails.
    pub fn toggle(&mut self) -> Result<Theme, PreferenceError> {
        self.set(!self.dark_mode)
    }

    /// Store an explicit value. Like `toggle`, memory is updated first.
    pub fn set(&mut self, dark_mode: bool) -> Result<Theme, PreferenceError> {
        self.dark_mode = dark_mode;
        self.write()?;
        Ok(self.theme())
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn theme(&self) -> Theme {
        Theme::from_dark_mode(self.dark_mode)
    }

    fn read(&self) -> Result<StoredPreferences, PreferenceError> {
        if !self.path.exists() {
            return Ok(StoredPreferences::default());
        }
        let content = fs::read_to_string(&self.path).map_err(|source| PreferenceError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self) -> Result<(), PreferenceError> {
        let io_err = |source| PreferenceError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string(&StoredPreferences {
            dark_mode: self.dark_mode,
        })?;
        fs::write(&self.path, content).map_err(io_err)
    }
}
