//! The injectable logging system.
//!
//! A [`LoggingSystem`] is one resolved configuration plus the output it
//! built. Applications can own one at their root and pass it down, or let
//! [`crate::init`] store one as the process default.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, reload};

use crate::config::{ISO8601_FORMAT, LogFormat, LoggerConfig};
use crate::context::Context;
use crate::error::Result;
use crate::handle::{self, LoggerHandle};
use crate::level::Level;
use crate::logger::{Core, Logger};
use crate::sink::Sink;

type AmbientFilter = reload::Handle<EnvFilter, Registry>;
type AmbientSubscriber = Layered<reload::Layer<EnvFilter, Registry>, Registry>;

/// Reload handle of the global ambient subscriber, once installed.
static AMBIENT: Mutex<Option<AmbientFilter>> = Mutex::new(None);

/// A configured logger factory.
#[derive(Debug)]
pub struct LoggingSystem {
    config: LoggerConfig,
    sink: Sink,
    core: Arc<Core>,
}

impl LoggingSystem {
    /// Build a system writing to standard output.
    pub fn new(config: LoggerConfig) -> Result<Self> {
        Self::with_sink(config, Sink::Stdout)
    }

    /// Build a system writing to `sink`.
    pub fn with_sink(config: LoggerConfig, sink: Sink) -> Result<Self> {
        let core = Core::build(&config, sink.clone())?;
        Ok(Self {
            config,
            sink,
            core: Arc::new(core),
        })
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub fn level(&self) -> Level {
        self.config.level
    }

    /// An untagged logger on this system's output.
    pub fn logger(&self) -> Logger {
        Logger::new(Arc::clone(&self.core))
    }

    /// The handle attached to `ctx`, or a fresh untagged one from this system.
    ///
    /// Never modifies `ctx`.
    pub fn logger_for(&self, ctx: &Context) -> Arc<LoggerHandle> {
        handle::get_or_new(ctx, || self.logger())
    }

    /// `ctx` with a logger handle attached. A context that already carries a
    /// handle is returned as is.
    pub fn attach(&self, ctx: &Context) -> Context {
        handle::attach(ctx, || self.logger())
    }

    /// A new logger tagged with `key=value`, derived from the handle in `ctx`
    /// or from this system. Nothing reachable from `ctx` changes.
    pub fn logger_with_value(
        &self,
        ctx: &Context,
        key: impl Into<String>,
        value: impl Serialize,
    ) -> Logger {
        self.logger_for(ctx).with_tag(key, value)
    }

    /// Route ambient `tracing` events and `log` records through this configuration.
    ///
    /// The first call installs a global subscriber; later calls only swap its
    /// level filter. Fails if a subscriber this crate does not own is already
    /// installed globally.
    pub fn redirect_ambient(&self) -> Result<()> {
        let filter = EnvFilter::try_new(self.config.level.ambient_directive())?;
        let mut ambient = AMBIENT.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(handle) = ambient.as_ref() {
            handle.reload(filter)?;
            // The `log` bridge caches its ceiling at install time
            log::set_max_level(self.config.level.log_filter());
            tracing::debug!(level = %self.config.level, "ambient log level reloaded");
            return Ok(());
        }

        let (filter, handle) = reload::Layer::new(filter);
        tracing_subscriber::registry()
            .with(filter)
            .with(self.ambient_layer())
            .try_init()?;
        log::set_max_level(self.config.level.log_filter());
        *ambient = Some(handle);
        Ok(())
    }

    fn ambient_layer(&self) -> Box<dyn Layer<AmbientSubscriber> + Send + Sync> {
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(self.sink.clone())
            .with_timer(ChronoLocal::new(ISO8601_FORMAT.to_string()))
            .with_ansi(false);

        match self.config.format {
            LogFormat::Json => layer.json().flatten_event(true).boxed(),
            LogFormat::Text => layer.boxed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::SharedBuffer;

    fn system_at(level: Level) -> (LoggingSystem, SharedBuffer) {
        let (sink, buffer) = Sink::buffer();
        let system = LoggingSystem::with_sink(LoggerConfig::with_level(level), sink).unwrap();
        (system, buffer)
    }

    fn messages(buffer: &SharedBuffer) -> Vec<String> {
        buffer
            .records()
            .iter()
            .filter_map(|r| r["message"].as_str().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_each_threshold_emits_at_or_above() {
        let emitters = [
            Level::Debug,
            Level::Info,
            Level::Warn,
            Level::Error,
            Level::Fatal,
        ];

        for threshold in Level::ALL {
            let (system, buffer) = system_at(threshold);
            let logger = system.logger();
            for level in emitters {
                logger.log(level, level);
            }

            let expected: Vec<String> = emitters
                .iter()
                .filter(|level| **level >= threshold)
                .map(|level| level.to_string())
                .collect();
            assert_eq!(messages(&buffer), expected, "threshold {threshold}");
        }
    }

    #[test]
    fn test_unknown_level_behaves_like_info() {
        for name in ["trace", "", "DEBUG"] {
            let (system, buffer) = system_at(Level::from_name(name));
            assert_eq!(system.level(), Level::Info);

            let logger = system.logger();
            logger.debug("hidden");
            logger.info("shown");
            assert_eq!(messages(&buffer), vec!["shown"]);
        }
    }

    #[test]
    fn test_logger_for_empty_context_uses_system() {
        let (system, buffer) = system_at(Level::Info);
        let ctx = Context::new();

        let handle = system.logger_for(&ctx);
        handle.info("usable");

        assert!(handle.logger().same_output(&system.logger()));
        assert!(handle.logger().fields().is_empty());
        assert!(handle::attached(&ctx).is_none());
        assert_eq!(messages(&buffer), vec!["usable"]);
    }

    #[test]
    fn test_attach_is_idempotent() {
        let (system, _) = system_at(Level::Info);
        let once = system.attach(&Context::new());
        let twice = system.attach(&once);

        let a = handle::attached(&once).unwrap();
        let b = handle::attached(&twice).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_attach_keeps_handle_across_reconfiguration() {
        let (old, _) = system_at(Level::Debug);
        let ctx = old.attach(&Context::new());
        let original = handle::attached(&ctx).unwrap();

        let (new, _) = system_at(Level::Error);
        let ctx = new.attach(&ctx);

        let current = handle::attached(&ctx).unwrap();
        assert!(Arc::ptr_eq(&original, &current));
        assert_eq!(current.logger().level(), Level::Debug);
    }

    #[test]
    fn test_logger_with_value_is_independent() {
        let (system, buffer) = system_at(Level::Debug);
        let ctx = system.attach(&Context::new());

        for attempt in 0..5 {
            let logger = system.logger_with_value(&ctx, "req_id", "abc");
            assert_eq!(logger.fields().len(), 1);
            logger.info(format_args!("attempt {attempt}"));
        }

        let handle = system.logger_for(&ctx);
        assert!(handle.logger().fields().is_empty());

        let records = buffer.records();
        assert_eq!(records.len(), 5);
        assert!(records.iter().all(|r| r["req_id"] == "abc"));
    }

    #[test]
    fn test_logger_with_value_builds_on_attached_tags() {
        let (system, _) = system_at(Level::Debug);
        let ctx = system.attach(&Context::new());
        system.logger_for(&ctx).set_tag("user", "ada");

        let logger = system.logger_with_value(&ctx, "req_id", "abc");
        let keys: Vec<_> = logger.fields().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["user", "req_id"]);
    }
}
