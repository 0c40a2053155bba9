//! Registry errors.

use thiserror::Error;
use weft_auth::AccessDenied;
use weft_types::ErrorCode;

/// Registry error.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The operation needs an addressable leaf but the path is blank.
    #[error("invalid path: '{0}'")]
    InvalidPath(String),

    /// A capability mask could not be built.
    #[error("invalid capability: {0}")]
    InvalidCapability(String),

    /// Mask lacks the required bits and the caller is not the owner.
    #[error(transparent)]
    PermissionDenied(#[from] AccessDenied),

    /// A leaf value sits where the path needs a subtree.
    #[error("'{path}' is a value, not a subtree")]
    NotATree {
        /// Canonical path of the offending node.
        path: String,
    },

    /// Linking the handle at the path would make the tree contain itself.
    #[error("storing this handle at '{path}' would create a cycle")]
    Cycle {
        /// Canonical target path.
        path: String,
    },

    /// The registry could not be constructed.
    #[error("registry initialization failed: {0}")]
    Initialization(String),

    /// Anything else; the original failure is kept as the source.
    #[error("registry {operation} failed: {source}")]
    Unexpected {
        /// The operation that failed.
        operation: String,
        /// The original failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl RegistryError {
    pub(crate) fn unexpected(
        operation: &str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Unexpected {
            operation: operation.to_string(),
            source: Box::new(source),
        }
    }
}

impl ErrorCode for RegistryError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidPath(_) => "REGISTRY_INVALID_PATH",
            Self::InvalidCapability(_) => "REGISTRY_INVALID_CAPABILITY",
            Self::PermissionDenied(_) => "REGISTRY_PERMISSION_DENIED",
            Self::NotATree { .. } => "REGISTRY_NOT_A_TREE",
            Self::Cycle { .. } => "REGISTRY_CYCLE",
            Self::Initialization(_) => "REGISTRY_INITIALIZATION",
            Self::Unexpected { .. } => "REGISTRY_UNEXPECTED",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Unexpected { .. })
    }
}
