//! Event bus errors.
//!
//! | Variant | Code | Recoverable |
//! |---------|------|-------------|
//! | [`EventError::InvalidTopic`] | `EVENT_INVALID_TOPIC` | No |
//! | [`EventError::NoTopics`] | `EVENT_NO_TOPICS` | No |
//! | [`EventError::DepthExceeded`] | `EVENT_DEPTH_EXCEEDED` | No |
//! | [`EventError::Initialization`] | `EVENT_INITIALIZATION` | No |
//! | [`EventError::NotInstalled`] | `EVENT_NOT_INSTALLED` | Yes |
//! | [`EventError::Unexpected`] | `EVENT_UNEXPECTED` | Yes |
//!
//! `Unexpected` always carries the original failure as its
//! [`source`](std::error::Error::source), so a caller can walk the chain
//! down to the root cause even through nested publishes.

use thiserror::Error;
use weft_types::ErrorCode;

/// Boxed error type listeners may fail with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Event bus error.
#[derive(Debug, Error)]
pub enum EventError {
    /// Topic string is blank after canonicalization.
    #[error("invalid topic: '{0}'")]
    InvalidTopic(String),

    /// `bind` was given an empty set of topics.
    #[error("no topics given")]
    NoTopics,

    /// A listener published recursively past the configured limit.
    #[error("publish depth exceeded (depth={depth}, max={max_depth})")]
    DepthExceeded {
        /// Depth the rejected publish would have run at.
        depth: usize,
        /// Configured maximum.
        max_depth: usize,
    },

    /// The bus could not be set up.
    #[error("event bus initialization failed: {0}")]
    Initialization(String),

    /// The process-wide bus is required but has not been installed.
    #[error("event bus not installed")]
    NotInstalled,

    /// A listener failed while handling an event.
    #[error("listener {listener} failed on '{topic}': {source}")]
    Unexpected {
        /// Canonical topic being dispatched.
        topic: String,
        /// Identity of the failing listener.
        listener: String,
        /// The original failure.
        #[source]
        source: BoxError,
    },
}

impl EventError {
    /// Walks the source chain and returns the innermost cause.
    #[must_use]
    pub fn root_cause(&self) -> &(dyn std::error::Error + 'static) {
        let mut current: &(dyn std::error::Error + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }
}

impl ErrorCode for EventError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidTopic(_) => "EVENT_INVALID_TOPIC",
            Self::NoTopics => "EVENT_NO_TOPICS",
            Self::DepthExceeded { .. } => "EVENT_DEPTH_EXCEEDED",
            Self::Initialization(_) => "EVENT_INITIALIZATION",
            Self::NotInstalled => "EVENT_NOT_INSTALLED",
            Self::Unexpected { .. } => "EVENT_UNEXPECTED",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotInstalled | Self::Unexpected { .. })
    }
}
