//! Hierarchical topic-based event bus.
//!
//! Components of a weft application talk to each other by publishing
//! [`Event`]s on slash-separated topics and binding [`Listener`]s to
//! them. Publishing on `app/request/start` runs the listeners bound to
//! `app`, then `app/request`, then `app/request/start`, in that order.
//!
//! # Overview
//!
//! ```text
//! bind(L1, "app")                 root
//! bind(L2, "app.request.start")     └─ app          [L1]
//!                                        └─ request
//!                                             └─ start [L2]
//!
//! publish("App/Request/Start")  →  L1, L2
//! ```
//!
//! - Topics are canonicalized (see [`Topic`]).
//! - Dispatch runs off a snapshot taken at publish time; listeners may
//!   bind, unbind, and publish while they run.
//! - A listener returning [`Flow::Stop`] ends the dispatch.
//! - `once` bindings are removed after their first successful run.
//! - Binding the same [`ListenerKey`] to the same topic twice is a no-op.
//!
//! # Example
//!
//! ```
//! use weft_event::{Event, EventBus, Flow, Listener};
//!
//! let bus = EventBus::new();
//! bus.bind(Listener::closure(|_| Ok(Flow::Stop)), "app", false).unwrap();
//! bus.bind(Listener::closure(|_| panic!("cancelled")), "app.request", false).unwrap();
//!
//! assert!(bus.publish(&Event::new("app.request")).unwrap());
//! ```
//!
//! # Lifecycle topics
//!
//! Framework components announce their lifecycle as
//! `<component>.<verb>.<phase>`; see [`lifecycle_topic`] and [`Phase`].
//!
//! # Process-wide bus
//!
//! [`global`] holds the single bus of a process. Publishing there before
//! it is installed returns `Ok(false)` instead of failing.

mod bus;
mod error;
mod event;
pub mod global;
mod listener;
mod phase;
mod topic;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use bus::{BindingHandle, EventBus, DEFAULT_MAX_DEPTH};
pub use error::{BoxError, EventError};
pub use event::{share, Event, Param, SharedValue};
pub use listener::{Flow, Listener, ListenerFn, ListenerKey, ListenerResult};
pub use phase::{init_topic, lifecycle_topic, Phase, INIT_VERB};
pub use topic::{IntoTopics, Topic};
