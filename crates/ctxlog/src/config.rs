//! Logger configuration.
//!
//! Output always goes to standard output with ISO-8601 timestamps; the knobs
//! here are the severity threshold, the record encoding, and whether ambient
//! `tracing`/`log` calls are routed through the same configuration.
//!
//! ```toml
//! level = "warn"
//! format = "json"
//! redirect_ambient = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::level::Level;

/// Environment variable overriding the configured level.
pub const LEVEL_ENV: &str = "CTXLOG_LEVEL";
/// Environment variable overriding the configured format.
pub const FORMAT_ENV: &str = "CTXLOG_FORMAT";

/// Timestamp layout: ISO-8601 with milliseconds and numeric UTC offset.
pub const ISO8601_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Record encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable single-line text.
    Text,
}

/// Configuration for a [`crate::LoggingSystem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Severity threshold. Unknown names resolve to `info`.
    pub level: Level,
    /// Record encoding.
    pub format: LogFormat,
    /// Route ambient `tracing` events and `log` records through this configuration.
    pub redirect_ambient: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            format: LogFormat::Json,
            redirect_ambient: true,
        }
    }
}

impl LoggerConfig {
    /// Default configuration at the given level.
    pub fn with_level(level: impl Into<Level>) -> Self {
        Self {
            level: level.into(),
            ..Self::default()
        }
    }

    /// Set the record format.
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable or disable ambient redirection.
    pub fn redirect_ambient(mut self, redirect: bool) -> Self {
        self.redirect_ambient = redirect;
        self
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Apply `CTXLOG_LEVEL` / `CTXLOG_FORMAT` overrides from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_overrides(
            std::env::var(LEVEL_ENV).ok().as_deref(),
            std::env::var(FORMAT_ENV).ok().as_deref(),
        )
    }

    fn apply_overrides(mut self, level: Option<&str>, format: Option<&str>) -> Self {
        if let Some(level) = level {
            self.level = Level::from_name(level);
        }
        match format {
            Some("json") => self.format = LogFormat::Json,
            Some("text") => self.format = LogFormat::Text,
            _ => {}
        }
        self
    }
}
