//! Severity levels understood by the facade.
//!
//! The wrapped `tracing` stack tops out at `ERROR`, so `fatal` and `panic`
//! are tracked here and mapped onto `ERROR` when a record is emitted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum severity a logger emits. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    /// Logged, then the process exits.
    Fatal,
    /// Logged, then the caller panics.
    Panic,
}

impl Level {
    /// All levels, least severe first.
    pub const ALL: [Level; 6] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
        Level::Panic,
    ];

    /// Resolve a level name. Unknown names (including other casings) fall back to `Info`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "debug" => Level::Debug,
            "info" => Level::Info,
            "warn" => Level::Warn,
            "error" => Level::Error,
            "fatal" => Level::Fatal,
            "panic" => Level::Panic,
            _ => Level::Info,
        }
    }

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
            Level::Panic => "panic",
        }
    }

    /// The `tracing` level a record of this severity is emitted at.
    pub fn as_tracing(&self) -> tracing::Level {
        match self {
            Level::Debug => tracing::Level::DEBUG,
            Level::Info => tracing::Level::INFO,
            Level::Warn => tracing::Level::WARN,
            Level::Error | Level::Fatal | Level::Panic => tracing::Level::ERROR,
        }
    }

    /// Filter directive for records emitted through the facade.
    pub(crate) fn record_directive(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error | Level::Fatal | Level::Panic => "error",
        }
    }

    /// Filter directive for ambient `tracing`/`log` calls made outside the facade.
    ///
    /// Ambient callers cannot log above `ERROR`, so a `fatal` or `panic`
    /// threshold silences them entirely.
    pub(crate) fn ambient_directive(&self) -> &'static str {
        match self {
            Level::Fatal | Level::Panic => "off",
            other => other.record_directive(),
        }
    }

    /// Ceiling for records arriving through the `log` crate.
    pub(crate) fn log_filter(&self) -> log::LevelFilter {
        match self {
            Level::Debug => log::LevelFilter::Debug,
            Level::Info => log::LevelFilter::Info,
            Level::Warn => log::LevelFilter::Warn,
            Level::Error => log::LevelFilter::Error,
            Level::Fatal | Level::Panic => log::LevelFilter::Off,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Level {
    fn from(name: &str) -> Self {
        Level::from_name(name)
    }
}

impl From<String> for Level {
    fn from(name: String) -> Self {
        Level::from_name(&name)
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.as_str().to_string()
    }
}
