//! Request-scoped propagation object.
//!
//! A [`Context`] is an immutable, cheaply cloned chain of values keyed by
//! *type*. Deriving a context with a new value leaves the original untouched,
//! so a context can be handed to concurrent tasks and extended independently
//! by each of them.
//!
//! ```rust
//! use ctxlog::{Context, ContextKey};
//!
//! struct RequestId;
//! impl ContextKey for RequestId {
//!     type Value = String;
//! }
//!
//! let ctx = Context::new().with_value::<RequestId>("req-42".to_string());
//! assert_eq!(ctx.value::<RequestId>().map(String::as_str), Some("req-42"));
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A key for values stored in a [`Context`].
///
/// The implementing type itself is the key, so two crates can never collide
/// by picking the same name; keep key types private to control access.
pub trait ContextKey: 'static {
    /// Type of the value stored under this key.
    type Value: Send + Sync + 'static;
}

/// Immutable, type-keyed propagation object.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Entry>>,
}

struct Entry {
    key: TypeId,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Entry>>,
}

impl Context {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a context that carries `value` under `K`, shadowing any earlier value for `K`.
    pub fn with_value<K: ContextKey>(&self, value: K::Value) -> Self {
        Self {
            head: Some(Arc::new(Entry {
                key: TypeId::of::<K>(),
                value: Arc::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// The most recent value stored under `K`.
    pub fn value<K: ContextKey>(&self) -> Option<&K::Value> {
        let key = TypeId::of::<K>();
        let mut cursor = self.head.as_deref();
        while let Some(entry) = cursor {
            if entry.key == key {
                return entry.value.downcast_ref::<K::Value>();
            }
            cursor = entry.parent.as_deref();
        }
        None
    }

    /// Whether a value is stored under `K`.
    pub fn contains<K: ContextKey>(&self) -> bool {
        self.value::<K>().is_some()
    }

    /// Whether both contexts are the same derivation (not merely equal contents).
    pub fn ptr_eq(&self, other: &Context) -> bool {
        match (&self.head, &other.head) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.head.as_deref();
        while let Some(entry) = cursor {
            depth += 1;
            cursor = entry.parent.as_deref();
        }
        depth
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("values", &self.depth())
            .finish()
    }
}
