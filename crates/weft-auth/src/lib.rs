//! Access control primitives for weft registries.
//!
//! A registry advertises a [`Capability`] mask to every caller that is
//! not its owner. The owner can always do anything to its own registry.
//!
//! ```text
//! allowed = mask ⊇ required  ∨  caller is owner
//! ```
//!
//! | Item | Role |
//! |------|------|
//! | [`Capability`] | Bitset of registry operations (EXISTS, GET, ... UNREGISTER) |
//! | [`authorize`] | The single gate every registry operation goes through |
//! | [`Access`] | How a call was let through (mask or owner bypass) |
//! | [`AccessDenied`] | The permission-denied logic error |
//!
//! # Example
//!
//! ```
//! use weft_auth::{authorize, Access, Capability};
//!
//! let mask = Capability::READ;
//! assert_eq!(
//!     authorize(mask, Capability::GET, false, "get").unwrap(),
//!     Access::Granted
//! );
//! assert!(authorize(mask, Capability::SET, false, "set").is_err());
//! assert_eq!(
//!     authorize(mask, Capability::SET, true, "set").unwrap(),
//!     Access::OwnerBypass
//! );
//! ```

pub mod capability;
pub mod error;
mod gate;

pub use capability::Capability;
pub use error::AccessDenied;
pub use gate::{authorize, Access};
