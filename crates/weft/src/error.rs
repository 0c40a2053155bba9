//! Kernel errors.

use crate::config::ConfigError;
use thiserror::Error;
use weft_component::ComponentError;
use weft_event::EventError;
use weft_registry::RegistryError;
use weft_types::ErrorCode;

/// Error raised while booting or driving a [`Kernel`](crate::Kernel).
#[derive(Debug, Error)]
pub enum KernelError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Bus construction, installation or publishing failed.
    #[error(transparent)]
    Event(#[from] EventError),

    /// A registry could not be built.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A component failed to initialize.
    #[error(transparent)]
    Component(#[from] ComponentError),

    /// The tracing subscriber could not be installed.
    ///
    /// **Not recoverable** - bad filter or a subscriber is already set.
    #[error("logging setup failed: {0}")]
    Logging(String),
}

impl ErrorCode for KernelError {
    fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "KERNEL_CONFIG",
            Self::Event(_) => "KERNEL_EVENT",
            Self::Registry(_) => "KERNEL_REGISTRY",
            Self::Component(_) => "KERNEL_COMPONENT",
            Self::Logging(_) => "KERNEL_LOGGING",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Config(e) => e.is_recoverable(),
            Self::Event(e) => e.is_recoverable(),
            Self::Registry(e) => e.is_recoverable(),
            Self::Component(e) => e.is_recoverable(),
            Self::Logging(_) => false,
        }
    }
}
