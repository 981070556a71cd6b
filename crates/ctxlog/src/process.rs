//! Process-wide default logging system.
//!
//! The default is built lazily at level `debug` the first time anything asks
//! for it, and replaced wholesale by every [`init`]. Loggers and handles that
//! were created before a replacement keep writing with the configuration they
//! were created from.

use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use serde::Serialize;

use crate::config::LoggerConfig;
use crate::context::Context;
use crate::error::Result;
use crate::handle::LoggerHandle;
use crate::level::Level;
use crate::logger::Logger;
use crate::system::LoggingSystem;

/// Level used for the implicit startup initialization.
pub const STARTUP_LEVEL: &str = "debug";

static DEFAULT: LazyLock<RwLock<Arc<LoggingSystem>>> =
    LazyLock::new(|| RwLock::new(Arc::new(bootstrap(STARTUP_LEVEL))));

fn bootstrap(level_name: &str) -> LoggingSystem {
    let config = LoggerConfig::with_level(Level::from_name(level_name));
    let system = match LoggingSystem::new(config) {
        Ok(system) => system,
        Err(err) => panic!("failed to build logger: {err}"),
    };
    announce(&system, level_name);
    system
}

fn announce(system: &LoggingSystem, level_name: &str) {
    let logger = system.logger();
    if system.config().redirect_ambient {
        if let Err(err) = system.redirect_ambient() {
            logger.debug(format_args!("ambient logging not redirected: {err}"));
        }
    }
    logger.info(format_args!("logging initialized with level '{level_name}'"));
}

/// Reconfigure the process default logger from a level name.
///
/// Unknown names silently resolve to `info`. Output goes to standard output
/// with ISO-8601 timestamps, and ambient `tracing`/`log` calls are routed
/// through the new configuration.
///
/// # Panics
///
/// Panics if the logger cannot be built. There is no way to continue
/// without one.
pub fn init(level_name: &str) {
    // Force the startup default first so the replacement below is the one that sticks.
    LazyLock::force(&DEFAULT);
    install(bootstrap(level_name));
}

/// Reconfigure the process default from a full configuration, returning build errors.
pub fn init_with(config: LoggerConfig) -> Result<()> {
    LazyLock::force(&DEFAULT);
    let system = LoggingSystem::new(config)?;
    let level = system.level();
    announce(&system, level.as_str());
    install(system);
    Ok(())
}

/// Make `system` the process default, returning the one it replaces.
pub fn set_default(system: LoggingSystem) -> Arc<LoggingSystem> {
    install(system)
}

fn install(system: LoggingSystem) -> Arc<LoggingSystem> {
    let mut current = DEFAULT.write().unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *current, Arc::new(system))
}

/// The current process default system.
pub fn default_system() -> Arc<LoggingSystem> {
    Arc::clone(&DEFAULT.read().unwrap_or_else(PoisonError::into_inner))
}

/// An untagged logger on the current process default.
pub fn default_logger() -> Logger {
    default_system().logger()
}

/// The handle attached to `ctx`, or a fresh untagged handle on the process default.
///
/// Never modifies `ctx`.
pub fn logger(ctx: &Context) -> Arc<LoggerHandle> {
    crate::handle::get_or_new(ctx, default_logger)
}

/// `ctx` with a logger handle attached.
///
/// A context that already carries a handle is returned unchanged, even if the
/// process default was reconfigured since that handle was created.
pub fn context_with_logger(ctx: &Context) -> Context {
    crate::handle::attach(ctx, default_logger)
}

/// A new logger carrying `key=value`, derived from the handle in `ctx` or from
/// the process default.
///
/// Safe to call repeatedly with the same key: each call starts from the
/// handle's current tags, so bindings never pile up.
pub fn logger_with_value(ctx: &Context, key: impl Into<String>, value: impl Serialize) -> Logger {
    logger(ctx).with_tag(key, value)
}
