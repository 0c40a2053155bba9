//! Unified error-code interface.
//!
//! Every error enum in the kernel implements [`ErrorCode`] so callers
//! can branch on a stable machine-readable code instead of parsing
//! display strings.
//!
//! # Code Format
//!
//! - **UPPER_SNAKE_CASE**: e.g., `"EVENT_INVALID_TOPIC"`
//! - **Crate-prefixed**: `EVENT_`, `REGISTRY_`, `COMPONENT_`, `CONFIG_`
//! - **Stable**: codes are part of the public contract
//!
//! # Example
//!
//! ```
//! use weft_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum LookupError {
//!     Missing(String),
//!     Busy,
//! }
//!
//! impl ErrorCode for LookupError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Missing(_) => "LOOKUP_MISSING",
//!             Self::Busy => "LOOKUP_BUSY",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Busy)
//!     }
//! }
//!
//! assert_eq!(LookupError::Busy.code(), "LOOKUP_BUSY");
//! assert!(!LookupError::Missing("x".into()).is_recoverable());
//! ```

/// Machine-readable error code plus retry hint.
///
/// Non-recoverable errors are the ones a retry can never fix: invalid
/// input, permission denied, double initialization. Listener failures
/// are reported as recoverable because the listener may succeed on the
/// next publish.
pub trait ErrorCode {
    /// Returns a stable UPPER_SNAKE_CASE code with a crate prefix.
    fn code(&self) -> &'static str;

    /// Returns whether retrying the operation may succeed.
    fn is_recoverable(&self) -> bool;
}

/// Validates that an error code follows the kernel conventions.
///
/// # Panics
///
/// Panics if the code is empty, lacks `expected_prefix`, or is not
/// UPPER_SNAKE_CASE.
///
/// ```
/// use weft_types::{assert_error_code, ErrorCode};
///
/// struct Oops;
/// impl ErrorCode for Oops {
///     fn code(&self) -> &'static str { "MY_OOPS" }
///     fn is_recoverable(&self) -> bool { false }
/// }
///
/// assert_error_code(&Oops, "MY_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "Error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "Error code '{}' must start with prefix '{}'",
        code,
        expected_prefix
    );
    assert!(
        is_upper_snake_case(code),
        "Error code '{}' must be UPPER_SNAKE_CASE",
        code
    );
}

/// Validates every error in `errors`; use it over all variants of an enum.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }

    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
