//! Permission-denied error.

use crate::Capability;
use thiserror::Error;

/// A caller without the required capability bits, who is not the owner.
///
/// This is a logic error: the caller asked for something the registry
/// never advertised. It is never retried.
///
/// ```
/// use weft_auth::{AccessDenied, Capability};
///
/// let err = AccessDenied::new("set", Capability::SET, Capability::READ);
/// assert!(err.to_string().contains("'set'"));
/// assert_eq!(err.missing(), Capability::SET);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("permission denied: '{operation}' requires {required}, granted: {available}")]
pub struct AccessDenied {
    /// The operation that was attempted.
    pub operation: String,
    /// The capability the operation requires.
    pub required: Capability,
    /// The mask the registry advertises to non-owners.
    pub available: Capability,
}

impl AccessDenied {
    /// Creates a new denial record.
    #[must_use]
    pub fn new(operation: impl Into<String>, required: Capability, available: Capability) -> Self {
        Self {
            operation: operation.into(),
            required,
            available,
        }
    }

    /// Returns the bits the caller would have needed.
    #[must_use]
    pub fn missing(&self) -> Capability {
        self.available.missing(self.required)
    }
}
