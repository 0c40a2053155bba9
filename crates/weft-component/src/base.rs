//! Shared state of a framework component.

use crate::ComponentError;
use serde_json::json;
use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};
use weft_event::{
    init_topic, lifecycle_topic, BoxError, Event, EventBus, EventError, Listener,
    ListenerResult, Phase,
};
use weft_registry::{Capability, OwnerToken, Registry, RegistryScope};
use weft_types::ComponentId;

/// Identity, owned registry and lifecycle state of one component.
///
/// Lifecycle events are published as `<name>.<verb>.<phase>` where
/// `name` is the component id's name. Every event carries the
/// component's fully qualified name as its first parameter.
#[derive(Debug)]
pub struct ComponentBase {
    id: ComponentId,
    registry: Registry,
    token: OwnerToken,
    initialized: AtomicBool,
}

impl ComponentBase {
    /// Creates a component with an empty registry advertising `mask`.
    #[must_use]
    pub fn new(id: ComponentId, mask: Capability) -> Self {
        let (registry, token) = Registry::new(id.clone(), mask);
        Self {
            id,
            registry,
            token,
            initialized: AtomicBool::new(false),
        }
    }

    /// Wraps an already built registry.
    ///
    /// # Errors
    ///
    /// [`ComponentError::NotOwner`] if `token` was not minted for
    /// `registry` or the registry records a different owner.
    pub fn from_registry(
        id: ComponentId,
        registry: Registry,
        token: OwnerToken,
    ) -> Result<Self, ComponentError> {
        if !registry.is_owned_by(&token) || registry.owner() != &id {
            return Err(ComponentError::NotOwner(id.fqn()));
        }
        Ok(Self {
            id,
            registry,
            token,
            initialized: AtomicBool::new(false),
        })
    }

    /// The component's identity.
    #[must_use]
    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    /// Name used as the first topic segment of lifecycle events.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.id.name
    }

    /// The registry as everybody else sees it.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The registry with owner rights.
    #[must_use]
    pub fn owned(&self) -> RegistryScope<'_> {
        self.registry.with_owner(&self.token)
    }

    /// Returns `true` once [`initialize`](Self::initialize) succeeded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// A listener identified by this component and `method`.
    ///
    /// Binding it twice to one topic keeps a single binding.
    pub fn listener<F>(&self, method: impl Into<Cow<'static, str>>, f: F) -> Listener
    where
        F: Fn(&Event) -> ListenerResult + Send + Sync + 'static,
    {
        Listener::method(&self.id, method, f)
    }

    fn event(&self, topic: String) -> Event {
        Event::new(topic).with_param(json!(self.id.fqn()))
    }

    /// Runs one-time initialization.
    ///
    /// Publishes `<name>.init.pre`, calls `bind` to register the
    /// component's listeners, then publishes `<name>.init.post`.
    ///
    /// # Errors
    ///
    /// [`ComponentError::AlreadyInitialized`] on a second call. A
    /// failure of `bind` or of either publish is returned as is and
    /// leaves the component uninitialized.
    pub fn initialize<F>(&self, bus: &EventBus, bind: F) -> Result<(), ComponentError>
    where
        F: FnOnce(&EventBus) -> Result<(), EventError>,
    {
        if self
            .initialized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ComponentError::AlreadyInitialized(self.id.fqn()));
        }

        match self.run_initialize(bus, bind) {
            Ok(()) => {
                tracing::debug!(component = %self.id, "component initialized");
                Ok(())
            }
            Err(e) => {
                self.initialized.store(false, Ordering::Release);
                tracing::warn!(component = %self.id, error = %e, "component initialization failed");
                Err(e.into())
            }
        }
    }

    fn run_initialize<F>(&self, bus: &EventBus, bind: F) -> Result<(), EventError>
    where
        F: FnOnce(&EventBus) -> Result<(), EventError>,
    {
        bus.publish(&self.event(init_topic(self.name(), Phase::Pre)))?;
        bind(bus)?;
        bus.publish(&self.event(init_topic(self.name(), Phase::Post)))?;
        Ok(())
    }

    /// Wraps `op` in `<name>.<verb>.pre` / `.post` / `.error` events.
    ///
    /// On failure the error event carries the message as its second
    /// parameter and the original error is returned as the source of
    /// [`ComponentError::Operation`].
    ///
    /// # Errors
    ///
    /// [`ComponentError::Operation`] when `op` fails,
    /// [`ComponentError::Event`] when a lifecycle publish fails.
    pub fn perform<T, E, F>(&self, bus: &EventBus, verb: &str, op: F) -> Result<T, ComponentError>
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<BoxError>,
    {
        bus.publish(&self.event(lifecycle_topic(self.name(), verb, Phase::Pre)))?;

        match op() {
            Ok(value) => {
                bus.publish(&self.event(lifecycle_topic(self.name(), verb, Phase::Post)))?;
                Ok(value)
            }
            Err(e) => {
                let source = e.into();
                tracing::debug!(component = %self.id, verb, error = %source, "operation failed");
                let event = self
                    .event(lifecycle_topic(self.name(), verb, Phase::Error))
                    .with_param(json!(source.to_string()));
                bus.publish(&event)?;
                Err(ComponentError::Operation {
                    component: self.name().to_string(),
                    verb: verb.to_string(),
                    source,
                })
            }
        }
    }
}
