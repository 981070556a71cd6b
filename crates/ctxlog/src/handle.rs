//! Logger handles and their slot in a [`Context`].
//!
//! A context holds at most one [`LoggerHandle`], stored under a crate-private
//! key. Once attached, a handle is never replaced by [`attach`]: the first
//! writer wins, even if the process default logger is reconfigured later.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use crate::context::{Context, ContextKey};
use crate::logger::Logger;

/// Reserved context key for the request logger.
struct LoggerKey;

impl ContextKey for LoggerKey {
    type Value = Arc<LoggerHandle>;
}

/// Shared handle wrapping a [`Logger`].
///
/// Handles are immutable apart from [`LoggerHandle::set_tag`]. Prefer
/// [`LoggerHandle::with_tag`] (or [`crate::logger_with_value`]) which derive a
/// new logger instead of changing what every holder of the handle sees.
#[derive(Debug)]
pub struct LoggerHandle {
    logger: RwLock<Logger>,
}

impl LoggerHandle {
    /// Wrap a logger.
    pub fn new(logger: Logger) -> Self {
        Self {
            logger: RwLock::new(logger),
        }
    }

    /// Snapshot of the wrapped logger.
    pub fn logger(&self) -> Logger {
        self.logger
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Bind `key=value` on this handle for every later record made through it.
    ///
    /// This appends a binding; it does not replace an existing one. Calling it
    /// in a loop or retry path with the same key leaves one binding per call
    /// on the chain. Every holder of this handle (including every context it is
    /// attached to) observes the change, so only the handle's single owner
    /// should call it. Use [`LoggerHandle::with_tag`] for anything repeated.
    pub fn set_tag(&self, key: impl Into<String>, value: impl Serialize) {
        let mut logger = self.logger.write().unwrap_or_else(PoisonError::into_inner);
        *logger = logger.with(key, value);
    }

    /// Derive a logger carrying `key=value`, leaving the handle unchanged.
    pub fn with_tag(&self, key: impl Into<String>, value: impl Serialize) -> Logger {
        self.logger().with(key, value)
    }

    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        self.logger().debug(message);
    }

    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        self.logger().info(message);
    }

    #[track_caller]
    pub fn warn(&self, message: impl fmt::Display) {
        self.logger().warn(message);
    }

    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        self.logger().error(message);
    }

    #[track_caller]
    pub fn fatal(&self, message: impl fmt::Display) -> ! {
        self.logger().fatal(message)
    }

    #[track_caller]
    pub fn panic(&self, message: impl fmt::Display) -> ! {
        self.logger().panic(message)
    }
}

impl From<Logger> for LoggerHandle {
    fn from(logger: Logger) -> Self {
        Self::new(logger)
    }
}

/// The handle attached to `ctx`, if any.
pub fn attached(ctx: &Context) -> Option<Arc<LoggerHandle>> {
    ctx.value::<LoggerKey>().cloned()
}

/// The attached handle, or a fresh untagged handle on `fallback()`.
pub(crate) fn get_or_new(ctx: &Context, fallback: impl FnOnce() -> Logger) -> Arc<LoggerHandle> {
    attached(ctx).unwrap_or_else(|| Arc::new(LoggerHandle::new(fallback())))
}

/// `ctx` itself if it already carries a handle, otherwise `ctx` plus a new one.
pub(crate) fn attach(ctx: &Context, fallback: impl FnOnce() -> Logger) -> Context {
    if ctx.contains::<LoggerKey>() {
        return ctx.clone();
    }
    ctx.with_value::<LoggerKey>(get_or_new(ctx, fallback))
}
