//! Listeners and their identity.
//!
//! A [`Listener`] pairs a callback with a [`ListenerKey`]. The key is
//! what makes binding idempotent: binding two listeners with the same
//! key to the same topic leaves a single binding.
//!
//! | Constructor | Key | Dedupes with |
//! |-------------|-----|--------------|
//! | [`Listener::method`] | owner component + method name | same owner instance and method |
//! | [`Listener::function`] | function address | same `fn` item |
//! | [`Listener::closure`] | fresh anonymous id | nothing |

use crate::error::BoxError;
use crate::Event;
use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use weft_types::ComponentId;

/// Whether dispatch continues after a listener returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Run the next binding in the snapshot.
    Continue,
    /// Stop dispatch; no further binding in this publish runs.
    Stop,
}

impl From<bool> for Flow {
    /// `false` stops propagation, anything else continues.
    fn from(keep_going: bool) -> Self {
        if keep_going {
            Self::Continue
        } else {
            Self::Stop
        }
    }
}

impl From<()> for Flow {
    fn from((): ()) -> Self {
        Self::Continue
    }
}

/// What a listener returns.
pub type ListenerResult = Result<Flow, BoxError>;

/// A plain listener function; its address is its identity.
pub type ListenerFn = fn(&Event) -> ListenerResult;

pub(crate) type Callback = Arc<dyn Fn(&Event) -> ListenerResult + Send + Sync>;

static NEXT_ANONYMOUS: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a listener target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListenerKey {
    /// A method on a component instance.
    Method {
        /// The owning component instance.
        owner: ComponentId,
        /// Method name.
        method: Cow<'static, str>,
    },
    /// A free function, keyed by address.
    Function(usize),
    /// A closure with no external identity; never deduplicated.
    Anonymous(u64),
}

impl ListenerKey {
    /// Returns the owning component for method keys.
    #[must_use]
    pub fn owner(&self) -> Option<&ComponentId> {
        match self {
            Self::Method { owner, .. } => Some(owner),
            _ => None,
        }
    }
}

impl fmt::Display for ListenerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method { owner, method } => write!(f, "{}.{}", owner.fqn(), method),
            Self::Function(addr) => write!(f, "fn@{addr:#x}"),
            Self::Anonymous(n) => write!(f, "closure#{n}"),
        }
    }
}

/// A bindable callback with its identity.
#[derive(Clone)]
pub struct Listener {
    key: ListenerKey,
    callback: Callback,
}

impl Listener {
    /// A listener standing for `owner`'s `method`.
    ///
    /// ```
    /// use weft_event::{Flow, Listener};
    /// use weft_types::ComponentId;
    ///
    /// let view = ComponentId::builtin("view");
    /// let a = Listener::method(&view, "on_render", |_| Ok(Flow::Continue));
    /// let b = Listener::method(&view, "on_render", |_| Ok(Flow::Continue));
    /// assert_eq!(a.key(), b.key());
    /// ```
    pub fn method<F>(owner: &ComponentId, method: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&Event) -> ListenerResult + Send + Sync + 'static,
    {
        Self {
            key: ListenerKey::Method {
                owner: owner.clone(),
                method: method.into(),
            },
            callback: Arc::new(f),
        }
    }

    /// A listener for a free function.
    ///
    /// Distinct functions with identical bodies may be merged by the
    /// compiler and then share an address.
    pub fn function(f: ListenerFn) -> Self {
        Self {
            key: ListenerKey::Function(f as usize),
            callback: Arc::new(f),
        }
    }

    /// A listener with a fresh anonymous identity.
    pub fn closure<F>(f: F) -> Self
    where
        F: Fn(&Event) -> ListenerResult + Send + Sync + 'static,
    {
        Self {
            key: ListenerKey::Anonymous(NEXT_ANONYMOUS.fetch_add(1, Ordering::Relaxed)),
            callback: Arc::new(f),
        }
    }

    /// The listener's identity.
    #[must_use]
    pub fn key(&self) -> &ListenerKey {
        &self.key
    }

    /// Invokes the callback directly, outside any bus.
    ///
    /// # Errors
    ///
    /// Whatever the callback returns.
    pub fn call(&self, event: &Event) -> ListenerResult {
        (self.callback)(event)
    }

    pub(crate) fn into_parts(self) -> (ListenerKey, Callback) {
        (self.key, self.callback)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("key", &self.key).finish()
    }
}
