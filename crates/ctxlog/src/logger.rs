//! Tagged loggers over a shared `tracing` dispatch.
//!
//! A [`Logger`] pairs a shared core (the configured dispatch plus its
//! threshold) with an append-only chain of key/value tags. Deriving a tagged
//! logger is O(1) and never touches the parent; the parent and every other
//! logger derived from it keep seeing exactly the tags they had.

use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

use crate::config::LoggerConfig;
use crate::error::Result;
use crate::format::{self, RecordFormat};
use crate::level::Level;
use crate::sink::Sink;

/// Target attached to every record emitted through the facade.
pub const RECORD_TARGET: &str = "ctxlog";

/// Configured output shared by every logger derived from one system.
#[derive(Debug)]
pub(crate) struct Core {
    threshold: Level,
    dispatch: Dispatch,
}

impl Core {
    pub(crate) fn build(config: &LoggerConfig, sink: Sink) -> Result<Self> {
        let filter = EnvFilter::try_new(config.level.record_directive())?;
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(sink)
            .with_ansi(false)
            .event_format(RecordFormat::new(config.format))
            .finish();
        let dispatch = Dispatch::new(subscriber);

        Ok(Self {
            threshold: config.level,
            dispatch,
        })
    }
}

/// A logger bound to zero or more tags.
#[derive(Debug, Clone)]
pub struct Logger {
    core: Arc<Core>,
    tags: TagChain,
}

impl Logger {
    pub(crate) fn new(core: Arc<Core>) -> Self {
        Self {
            core,
            tags: TagChain::default(),
        }
    }

    /// Derive a logger that also carries `key=value`.
    ///
    /// Binding a key that is already present adds a second binding; nothing
    /// is overwritten.
    pub fn with(&self, key: impl Into<String>, value: impl Serialize) -> Logger {
        Self {
            core: Arc::clone(&self.core),
            tags: self.tags.push(key.into(), tag_value(value)),
        }
    }

    /// Severity threshold of the configuration this logger was built from.
    pub fn level(&self) -> Level {
        self.core.threshold
    }

    /// Whether a record at `level` would be emitted.
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.core.threshold
    }

    /// Bound tags, oldest first. Duplicate keys appear once per binding.
    pub fn fields(&self) -> Vec<(&str, &Value)> {
        self.tags
            .nodes()
            .into_iter()
            .map(|node| (node.key.as_str(), &node.value))
            .collect()
    }

    /// Whether both loggers write through the same configuration.
    pub fn same_output(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }

    /// Emit `message` at `level` if it passes the threshold.
    ///
    /// `fatal` and `panic` records are emitted here without terminating; use
    /// [`Logger::fatal`] or [`Logger::panic`] for that.
    ///
    /// The record's `caller` is the source location of the call.
    #[track_caller]
    pub fn log(&self, level: Level, message: impl fmt::Display) {
        if self.enabled(level) {
            self.emit(level, &message, Location::caller());
        }
    }

    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        self.log(Level::Debug, message);
    }

    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        self.log(Level::Info, message);
    }

    #[track_caller]
    pub fn warn(&self, message: impl fmt::Display) {
        self.log(Level::Warn, message);
    }

    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        self.log(Level::Error, message);
    }

    /// Emit at `fatal`, then exit the process with status 1.
    #[track_caller]
    pub fn fatal(&self, message: impl fmt::Display) -> ! {
        self.log(Level::Fatal, message);
        std::process::exit(1)
    }

    /// Emit at `panic`, then panic with the message.
    #[track_caller]
    pub fn panic(&self, message: impl fmt::Display) -> ! {
        let message = message.to_string();
        self.log(Level::Panic, &message);
        panic!("{message}")
    }

    fn emit(&self, level: Level, message: &dyn fmt::Display, location: &Location<'_>) {
        let encoded = format::encode_tags(&self.fields());
        let tags = encoded.as_deref();
        let caller = format!("{}:{}", location.file(), location.line());
        let caller = caller.as_str();

        tracing::dispatcher::with_default(&self.core.dispatch, || match level {
            Level::Debug => tracing::debug!(target: RECORD_TARGET, caller, tags, "{}", message),
            Level::Info => tracing::info!(target: RECORD_TARGET, caller, tags, "{}", message),
            Level::Warn => tracing::warn!(target: RECORD_TARGET, caller, tags, "{}", message),
            Level::Error => tracing::error!(target: RECORD_TARGET, caller, tags, "{}", message),
            Level::Fatal => tracing::error!(
                target: RECORD_TARGET,
                caller,
                severity = "fatal",
                tags,
                "{}",
                message
            ),
            Level::Panic => tracing::error!(
                target: RECORD_TARGET,
                caller,
                severity = "panic",
                tags,
                "{}",
                message
            ),
        });
    }
}

fn tag_value(value: impl Serialize) -> Value {
    serde_json::to_value(value)
        .unwrap_or_else(|err| Value::String(format!("<unserializable: {err}>")))
}

/// Persistent list of tags, newest at the head.
#[derive(Debug, Clone, Default)]
struct TagChain {
    head: Option<Arc<TagNode>>,
}

#[derive(Debug)]
struct TagNode {
    key: String,
    value: Value,
    parent: Option<Arc<TagNode>>,
}

impl TagChain {
    fn push(&self, key: String, value: Value) -> Self {
        Self {
            head: Some(Arc::new(TagNode {
                key,
                value,
                parent: self.head.clone(),
            })),
        }
    }

    fn nodes(&self) -> Vec<&TagNode> {
        let mut nodes = Vec::new();
        let mut cursor = self.head.as_deref();
        while let Some(node) = cursor {
            nodes.push(node);
            cursor = node.parent.as_deref();
        }
        nodes.reverse();
        nodes
    }
}

// Unlink iteratively so long chains built in loops don't overflow the stack.
impl Drop for TagNode {
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut node) => next = node.parent.take(),
                Err(_) => break,
            }
        }
    }
}
