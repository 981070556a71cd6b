//! Task-local request context.
//!
//! Lets async handlers reach the request logger without threading a
//! [`Context`] through every call. Outside a scope everything here falls back
//! to the empty context.

use std::future::Future;
use std::sync::Arc;

use crate::context::Context;
use crate::handle::LoggerHandle;

tokio::task_local! {
    static CURRENT_CONTEXT: Context;
}

/// Run `f` with `ctx` as the task's current context.
pub async fn with_context<F, T>(ctx: Context, f: F) -> T
where
    F: Future<Output = T>,
{
    CURRENT_CONTEXT.scope(ctx, f).await
}

/// Run `f` synchronously with `ctx` as the current context.
pub fn sync_with_context<T>(ctx: Context, f: impl FnOnce() -> T) -> T {
    CURRENT_CONTEXT.sync_scope(ctx, f)
}

/// Check if a context scope is active in the current task.
pub fn is_scoped() -> bool {
    CURRENT_CONTEXT.try_with(|_| ()).is_ok()
}

/// The scoped context, or an empty one outside any scope.
pub fn current_context() -> Context {
    CURRENT_CONTEXT.try_with(Context::clone).unwrap_or_default()
}

/// The logger for the scoped context (see [`crate::logger`]).
pub fn current_logger() -> Arc<LoggerHandle> {
    crate::process::logger(&current_context())
}
