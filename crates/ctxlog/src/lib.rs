//! Contextual logging facade.
//!
//! This crate wraps a `tracing` subscriber with a small amount of request
//! plumbing:
//!
//! - **Process default**: `init(level)` builds the process-wide logger
//!   (stdout, ISO-8601 timestamps, JSON records) and routes ambient
//!   `tracing`/`log` calls through it
//! - **Tags**: `Logger::with` derives a logger carrying extra key/value fields
//! - **Context**: a logger handle rides along in a type-keyed [`Context`],
//!   or in a task-local scope via [`with_context`]
//!
//! # Usage
//!
//! ```rust,no_run
//! use ctxlog::{Context, context_with_logger, logger, logger_with_value};
//!
//! ctxlog::init("info");
//!
//! // At the edge of a request
//! let ctx = context_with_logger(&Context::new());
//! logger(&ctx).set_tag("request_id", "r-1234");
//!
//! // Deeper in the call chain
//! logger(&ctx).info(format_args!("loaded {} rows", 12));
//!
//! // In a retry loop, derive instead of mutating the shared handle
//! for attempt in 1..=3 {
//!     logger_with_value(&ctx, "attempt", attempt).warn("upstream timed out");
//! }
//! ```
//!
//! # Explicit systems
//!
//! The process default is a convenience. Code that wants its configuration
//! injected can own a [`LoggingSystem`] and call the same operations on it:
//!
//! ```rust
//! use ctxlog::{Context, Level, LoggerConfig, LoggingSystem, Sink};
//!
//! let (sink, buffer) = Sink::buffer();
//! let system = LoggingSystem::with_sink(LoggerConfig::with_level(Level::Warn), sink).unwrap();
//!
//! let ctx = system.attach(&Context::new());
//! system.logger_for(&ctx).info("suppressed");
//! system.logger_for(&ctx).error("emitted");
//!
//! assert_eq!(buffer.records().len(), 1);
//! ```

pub mod config;
pub mod context;
pub mod error;
mod format;
pub mod handle;
pub mod level;
pub mod logger;
pub mod process;
pub mod scope;
pub mod sink;
pub mod system;

// Re-export main types
pub use config::{LogFormat, LoggerConfig};
pub use context::{Context, ContextKey};
pub use error::{Error, Result};
pub use handle::{LoggerHandle, attached};
pub use level::Level;
pub use logger::{Logger, RECORD_TARGET};
pub use process::{
    context_with_logger, default_logger, default_system, init, init_with, logger,
    logger_with_value, set_default,
};
pub use scope::{current_context, current_logger, is_scoped, sync_with_context, with_context};
pub use sink::{SharedBuffer, Sink};
pub use system::LoggingSystem;
