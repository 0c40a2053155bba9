//! Core types for the weft kernel.
//!
//! This crate holds the identity and error plumbing that both kernel
//! primitives share:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  weft-types     : ComponentId, ErrorCode         ◄── HERE   │
//! ├──────────────────────────────┬──────────────────────────────┤
//! │  weft-event                  │  weft-auth                   │
//! │  (Topic, EventBus)           │  (Capability, AccessDenied)  │
//! │                              ├──────────────────────────────┤
//! │                              │  weft-registry               │
//! ├──────────────────────────────┴──────────────────────────────┤
//! │  weft-component : ComponentBase (lifecycle + owned registry) │
//! ├─────────────────────────────────────────────────────────────┤
//! │  weft           : Kernel, config, logging                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Identity
//!
//! Every framework component is identified by a [`ComponentId`]. The
//! event bus uses it to derive listener identity (owner + method), and
//! the registry records it as the owner of an instance.
//!
//! # Example
//!
//! ```
//! use weft_types::ComponentId;
//!
//! // Every instance gets its own UUID, builtin ones included
//! let view = ComponentId::builtin("view");
//! assert_ne!(view, ComponentId::builtin("view"));
//! assert_eq!(view.fqn(), "builtin::view");
//!
//! let a = ComponentId::new("app", "cart");
//! let b = ComponentId::new("app", "cart");
//! assert_ne!(a, b);
//! assert_eq!(a.fqn(), b.fqn());
//! ```

mod error;
mod id;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::ComponentId;
