//! Error types for building and installing loggers.
//!
//! None of these reach callers of [`crate::init`]: a failed build there is
//! fatal. They surface through the explicit [`crate::LoggingSystem`] API.

use thiserror::Error;

/// Result type alias for logging setup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring the logging system.
#[derive(Debug, Error)]
pub enum Error {
    /// A filter directive could not be parsed.
    #[error("Invalid filter directive: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    /// The global ambient subscriber could not be installed.
    #[error("Failed to install ambient subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),

    /// The ambient level filter could not be reloaded.
    #[error("Failed to reload ambient filter: {0}")]
    Reload(#[from] tracing_subscriber::reload::Error),

    /// Configuration file could not be parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
