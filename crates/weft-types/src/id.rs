//! Component identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for a framework component.
///
/// A component is anything that participates in the request lifecycle
/// through the event bus and owns a registry: configuration, session,
/// router, cache, view renderer, or application code.
///
/// Every id carries a random UUID v4, builtin ones included, so two
/// instances of the same component are always distinct owners.
/// `PartialEq` compares all fields including the UUID; compare
/// [`fqn`](Self::fqn) to match by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentId {
    /// Globally unique identifier.
    pub uuid: Uuid,
    /// Namespace (e.g., "builtin", "app").
    pub namespace: String,
    /// Component name within namespace.
    pub name: String,
}

impl ComponentId {
    /// Creates a new [`ComponentId`] with a random UUID v4.
    ///
    /// ```
    /// use weft_types::ComponentId;
    ///
    /// let cart = ComponentId::new("app", "cart");
    /// assert_eq!(cart.fqn(), "app::cart");
    /// ```
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Creates an id in the `builtin` namespace.
    ///
    /// ```
    /// use weft_types::ComponentId;
    ///
    /// let a = ComponentId::builtin("session");
    /// let b = ComponentId::builtin("session");
    /// assert_eq!(a.fqn(), "builtin::session");
    /// assert_eq!(a.fqn(), b.fqn());
    /// assert_ne!(a, b);
    /// ```
    #[must_use]
    pub fn builtin(name: impl Into<String>) -> Self {
        Self::new("builtin", name)
    }

    /// Returns the fully qualified name in `namespace::name` format.
    #[must_use]
    pub fn fqn(&self) -> String {
        format!("{}::{}", self.namespace, self.name)
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}@{}", self.namespace, self.name, self.uuid)
    }
}
