//! Events and their parameters.
//!
//! An [`Event`] is built by a publisher right before
//! [`EventBus::publish`](crate::EventBus::publish) and is immutable
//! afterwards, with one exception: a [`Param::Shared`] parameter is a
//! shared handle that listeners are expected to modify in place, e.g. a
//! rendered-content buffer passed through `view.render.post`.
//!
//! ```
//! use serde_json::json;
//! use weft_event::{share, Event};
//!
//! let buffer = share(json!("<p>hi</p>"));
//! let event = Event::new("view.render.post")
//!     .with_param(json!({"template": "index"}))
//!     .with_shared(buffer.clone());
//!
//! // A listener appends to the buffer through the event...
//! if let Some(shared) = event.shared(1) {
//!     let mut out = shared.write();
//!     *out = json!(format!("{}<!-- footer -->", out.as_str().unwrap()));
//! }
//!
//! // ...and the publisher sees the change.
//! assert_eq!(*buffer.read(), json!("<p>hi</p><!-- footer -->"));
//! ```

use crate::{EventError, Topic};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;

/// A value that several parties read and write through the same handle.
pub type SharedValue = Arc<RwLock<Value>>;

/// Wraps a value into a [`SharedValue`].
#[must_use]
pub fn share(value: Value) -> SharedValue {
    Arc::new(RwLock::new(value))
}

/// One positional event parameter.
#[derive(Debug, Clone)]
pub enum Param {
    /// Plain value, copied into the event.
    Value(Value),
    /// Shared handle; writes are visible to the publisher.
    Shared(SharedValue),
}

impl Param {
    /// Returns the current value, reading through a shared handle.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        match self {
            Self::Value(v) => v.clone(),
            Self::Shared(s) => s.read().clone(),
        }
    }
}

/// An event: raw name plus ordered parameters.
#[derive(Debug, Clone)]
pub struct Event {
    name: String,
    params: Vec<Param>,
}

impl Event {
    /// Creates an event with no parameters.
    ///
    /// The name is kept raw; it is canonicalized at publish time.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Appends a plain value parameter.
    #[must_use]
    pub fn with_param(mut self, value: impl Into<Value>) -> Self {
        self.params.push(Param::Value(value.into()));
        self
    }

    /// Appends a shared, in-place mutable parameter.
    #[must_use]
    pub fn with_shared(mut self, handle: SharedValue) -> Self {
        self.params.push(Param::Shared(handle));
        self
    }

    /// The name as given by the publisher.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical topic for this event.
    ///
    /// # Errors
    ///
    /// [`EventError::InvalidTopic`] if the name is blank.
    pub fn topic(&self) -> Result<Topic, EventError> {
        Topic::parse(&self.name)
    }

    /// All parameters in order.
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Parameter at `index`.
    #[must_use]
    pub fn param(&self, index: usize) -> Option<&Param> {
        self.params.get(index)
    }

    /// Plain value at `index`; `None` if absent or shared.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<&Value> {
        match self.params.get(index)? {
            Param::Value(v) => Some(v),
            Param::Shared(_) => None,
        }
    }

    /// Shared handle at `index`; `None` if absent or plain.
    #[must_use]
    pub fn shared(&self, index: usize) -> Option<&SharedValue> {
        match self.params.get(index)? {
            Param::Shared(s) => Some(s),
            Param::Value(_) => None,
        }
    }
}
