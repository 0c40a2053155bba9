//! Component errors.

use thiserror::Error;
use weft_event::{BoxError, EventError};
use weft_registry::RegistryError;
use weft_types::ErrorCode;

/// Error raised by [`ComponentBase`](crate::ComponentBase).
#[derive(Debug, Error)]
pub enum ComponentError {
    /// `initialize` was called on a component that already ran it.
    ///
    /// **Not recoverable** - initialization happens once.
    #[error("component '{0}' is already initialized")]
    AlreadyInitialized(String),

    /// The owner token passed in does not belong to the registry, or
    /// the registry names another owner.
    ///
    /// **Not recoverable** - programming error.
    #[error("registry is not owned by '{0}'")]
    NotOwner(String),

    /// Publishing or binding a lifecycle event failed.
    #[error(transparent)]
    Event(#[from] EventError),

    /// The component's own registry refused an operation.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A wrapped operation failed; `<name>.<verb>.error` was published.
    ///
    /// **Recoverable** - the caller may retry the operation.
    #[error("{component}.{verb} failed: {source}")]
    Operation {
        /// Component name.
        component: String,
        /// Verb of the failed operation.
        verb: String,
        /// The original failure.
        #[source]
        source: BoxError,
    },
}

impl ErrorCode for ComponentError {
    fn code(&self) -> &'static str {
        match self {
            Self::AlreadyInitialized(_) => "COMPONENT_ALREADY_INITIALIZED",
            Self::NotOwner(_) => "COMPONENT_NOT_OWNER",
            Self::Event(_) => "COMPONENT_EVENT",
            Self::Registry(_) => "COMPONENT_REGISTRY",
            Self::Operation { .. } => "COMPONENT_OPERATION",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::AlreadyInitialized(_) | Self::NotOwner(_) => false,
            Self::Event(e) => e.is_recoverable(),
            Self::Registry(e) => e.is_recoverable(),
            Self::Operation { .. } => true,
        }
    }
}
