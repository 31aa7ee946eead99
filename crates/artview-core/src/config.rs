#![forbid(unsafe_code)]

//! Application configuration.
//!
//! Configuration is read from an optional JSON file and then overridden by
//! `ARTVIEW_*` environment variables:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `ARTVIEW_MODE` | `default_mode` |
//! | `ARTVIEW_TITLE` | `window_title` |
//! | `ARTVIEW_LOG` | `log.filter` |
//! | `ARTVIEW_LOG_JSON` | `log.json` (`1`/`true`/`yes`/`on`) |
//!
//! Missing fields in the file take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::ModeDefinition;
use crate::error::{Error, Result};

/// Logging configuration consumed by the binary's subscriber setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive string.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            json: false,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtviewConfig {
    pub window_title: String,
    /// Mode assembled at startup.
    pub default_mode: String,
    pub log: LogConfig,
    /// Extra modes; a mode with a built-in name replaces the built-in.
    pub modes: Vec<ModeDefinition>,
}

impl Default for ArtviewConfig {
    fn default() -> Self {
        Self {
            window_title: "ARTview".to_owned(),
            default_mode: "radar".to_owned(),
            log: LogConfig::default(),
            modes: Vec::new(),
        }
    }
}

#[inline]
fn env_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl ArtviewConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Apply `ARTVIEW_*` overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply `ARTVIEW_*` overrides from `get_env`.
    #[must_use]
    pub fn with_overrides_from<F>(mut self, get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = get_env("ARTVIEW_MODE") {
            self.default_mode = mode;
        }
        if let Some(title) = get_env("ARTVIEW_TITLE") {
            self.window_title = title;
        }
        if let Some(filter) = get_env("ARTVIEW_LOG") {
            self.log.filter = filter;
        }
        if let Some(json) = get_env("ARTVIEW_LOG_JSON") {
            self.log.json = env_flag(&json);
        }
        self
    }

    #[must_use]
    pub fn with_window_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = title.into();
        self
    }

    #[must_use]
    pub fn with_default_mode(mut self, mode: impl Into<String>) -> Self {
        self.default_mode = mode.into();
        self
    }

    #[must_use]
    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ModeDefinition) -> Self {
        self.modes.push(mode);
        self
    }
}
