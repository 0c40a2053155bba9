//! Capability-gated hierarchical data registry.
//!
//! Each framework component keeps its state in a [`Registry`] it
//! creates and therefore owns. It advertises a [`Capability`] mask to
//! everybody else; the owner itself, proven by the [`OwnerToken`] it got
//! at construction, is never restricted.
//!
//! ```text
//!             ┌───────────────────────────┐
//!  caller ───►│ authorize(mask, required) │── denied ──► PermissionDenied
//!             │   or owner token          │
//!             └────────────┬──────────────┘
//!                          ▼
//!                 split_path(path)  ──blank──► InvalidPath (leaf ops)
//!                          ▼
//!                   tree of NodeRef
//! ```
//!
//! # Operations
//!
//! | Operation | Capability | Blank path | Creates intermediates |
//! |-----------|------------|------------|-----------------------|
//! | `exists` | `EXISTS` | invalid | no |
//! | `get` / `get_ref` | `GET` / `GETREF` | whole tree | no |
//! | `register` / `register_ref` | `REGISTER` / `REGISTERREF` | invalid | yes |
//! | `set` / `set_ref` | `SET` / `SETREF` | whole tree | no |
//! | `unregister` | `UNREGISTER` | no-op | no |
//!
//! The `_ref` variants work with shared [`NodeRef`] handles instead of
//! value copies: a handle stored in two places is one node.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use weft_auth::Capability;
//! use weft_registry::{Registry, RegistryError};
//! use weft_types::ComponentId;
//!
//! let (session, token) = Registry::new(ComponentId::builtin("session"), Capability::READ);
//! session.with_owner(&token).register("weft.user.name", json!("ann")).unwrap();
//!
//! // Everybody can read...
//! assert_eq!(session.get("user.name").unwrap(), Some(json!("ann")));
//! // ...but only the owner can write.
//! assert!(matches!(
//!     session.set("user.name", json!("bob")),
//!     Err(RegistryError::PermissionDenied(_))
//! ));
//! ```

mod error;
mod node;
mod path;
mod registry;

pub use error::RegistryError;
pub use node::NodeRef;
pub use path::{split_path, DEFAULT_ROOT_NAMESPACE};
pub use registry::{OwnerToken, Registry, RegistryBuilder, RegistryScope};
pub use weft_auth::Capability;
