//! Composition kernel for weft web applications.
//!
//! This crate ties the kernel pieces together:
//!
//! | Piece | Crate | Role |
//! |-------|-------|------|
//! | [`EventBus`] | `weft-event` | hierarchical topic pub/sub with bubbling |
//! | [`Registry`] | `weft-registry` | capability-gated hierarchical store |
//! | [`ComponentBase`] | `weft-component` | identity, owned registry, lifecycle |
//! | [`config`] | this crate | layered TOML + `WEFT_*` configuration |
//! | [`logging`] | this crate | `tracing` subscriber setup |
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use weft::config::KernelConfig;
//! use weft::{Capability, ComponentId, Event, Flow, Kernel};
//!
//! let kernel = Kernel::new(KernelConfig::default()).unwrap();
//! let session = kernel
//!     .component(ComponentId::builtin("session"), Capability::READ)
//!     .unwrap();
//! session.owned().register("user.name", json!("ann")).unwrap();
//!
//! kernel
//!     .bus()
//!     .bind(session.listener("on_request", |_| Ok(Flow::Continue)), "app.request", false)
//!     .unwrap();
//!
//! assert!(kernel.publish(&Event::new("app.request.start")).unwrap());
//! assert_eq!(session.registry().get("weft.user.name").unwrap(), Some(json!("ann")));
//! ```

pub mod config;
mod error;
mod kernel;
pub mod logging;

pub use error::KernelError;
pub use kernel::Kernel;

pub use weft_component::{Component, ComponentBase, ComponentError};
pub use weft_event::{
    global, share, BindingHandle, BoxError, Event, EventBus, EventError, Flow, Listener,
    ListenerKey, ListenerResult, Param, Phase, SharedValue, Topic,
};
pub use weft_registry::{Capability, NodeRef, OwnerToken, Registry, RegistryError, RegistryScope};
pub use weft_types::{ComponentId, ErrorCode};
