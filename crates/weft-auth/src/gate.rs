//! The access gate shared by every registry operation.
//!
//! # Audit Logging
//!
//! - Granted by mask: trace level
//! - Granted by owner bypass: debug level
//! - Denied: warn level

use crate::{AccessDenied, Capability};

/// How a call was allowed through the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The advertised mask covers the operation.
    Granted,
    /// The mask does not cover it, but the caller is the owner.
    OwnerBypass,
}

/// Checks one operation against a registry's advertised mask.
///
/// The mask is consulted first; `is_owner` only matters when the mask
/// falls short.
///
/// # Errors
///
/// Returns [`AccessDenied`] when `available` lacks a bit of `required`
/// and the caller is not the owner.
pub fn authorize(
    available: Capability,
    required: Capability,
    is_owner: bool,
    operation: &str,
) -> Result<Access, AccessDenied> {
    if available.contains(required) {
        tracing::trace!(operation, required = %required, "registry access granted");
        return Ok(Access::Granted);
    }

    if is_owner {
        tracing::debug!(
            operation,
            required = %required,
            available = %available,
            "registry access granted by owner bypass"
        );
        return Ok(Access::OwnerBypass);
    }

    tracing::warn!(
        operation,
        required = %required,
        available = %available,
        "registry access denied"
    );
    Err(AccessDenied::new(operation, required, available))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_grants_without_owner() {
        let access = authorize(Capability::READ, Capability::EXISTS, false, "exists");
        assert_eq!(access, Ok(Access::Granted));
    }

    #[test]
    fn mask_takes_precedence_over_owner() {
        let access = authorize(Capability::ALL, Capability::SET, true, "set");
        assert_eq!(access, Ok(Access::Granted));
    }

    #[test]
    fn owner_bypasses_empty_mask() {
        let access = authorize(Capability::empty(), Capability::UNREGISTER, true, "unregister");
        assert_eq!(access, Ok(Access::OwnerBypass));
    }

    #[test]
    fn non_owner_denied() {
        let err = authorize(Capability::READ, Capability::SET, false, "set")
            .expect_err("SET is not in READ");
        assert_eq!(err.operation, "set");
        assert_eq!(err.required, Capability::SET);
        assert_eq!(err.available, Capability::READ);
    }

    #[test]
    fn empty_requirement_always_granted() {
        let access = authorize(Capability::empty(), Capability::empty(), false, "noop");
        assert_eq!(access, Ok(Access::Granted));
    }
}
