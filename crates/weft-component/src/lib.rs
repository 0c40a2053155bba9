//! Component base for the weft kernel.
//!
//! A framework component (configuration, session, router, cache, view)
//! owns exactly one [`Registry`](weft_registry::Registry) and binds its
//! listeners once, during initialization. [`ComponentBase`] holds that
//! state and publishes the lifecycle topics collaborators hook into:
//!
//! ```text
//! initialize:  <name>.init.pre  → bind() → <name>.init.post
//! perform:     <name>.<verb>.pre → op() → <name>.<verb>.post
//!                                      └→ <name>.<verb>.error
//! ```

mod base;
mod component;
mod error;

pub use base::ComponentBase;
pub use component::Component;
pub use error::ComponentError;
