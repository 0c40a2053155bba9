//! The kernel: one configured bus plus a factory for registries and
//! components that share its settings.

use crate::config::{ConfigLoader, KernelConfig};
use crate::KernelError;
use serde_json::Value;
use std::sync::Arc;
use weft_component::{Component, ComponentBase};
use weft_event::{global, Event, EventBus};
use weft_registry::{Capability, OwnerToken, Registry};
use weft_types::ComponentId;

/// Owns the event bus and the configuration every component is built
/// from.
///
/// [`Kernel::new`] keeps the bus private to the kernel, which is what
/// tests want. [`Kernel::boot`] additionally installs it as the
/// process-wide bus so [`weft_event::global`] publishes reach it.
#[derive(Debug)]
pub struct Kernel {
    config: KernelConfig,
    bus: Arc<EventBus>,
}

impl Kernel {
    /// Builds a kernel from an already loaded config.
    ///
    /// # Errors
    ///
    /// [`KernelError::Config`] if the config fails validation.
    pub fn new(config: KernelConfig) -> Result<Self, KernelError> {
        config.validate()?;
        let bus = EventBus::with_max_depth(config.bus.max_depth)?;

        tracing::info!(
            max_depth = config.bus.max_depth,
            root_namespace = %config.registry.root_namespace,
            "kernel created"
        );

        Ok(Self {
            config,
            bus: Arc::new(bus),
        })
    }

    /// Loads config through `loader`, then [`new`](Self::new).
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`](crate::config::ConfigError) from the loader,
    /// or as [`new`](Self::new).
    pub fn load(loader: &ConfigLoader) -> Result<Self, KernelError> {
        Self::new(loader.load()?)
    }

    /// Builds a kernel and installs its bus as the process-wide bus.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new), plus [`KernelError::Event`] if a global bus
    /// is already installed.
    pub fn boot(config: KernelConfig) -> Result<Self, KernelError> {
        let kernel = Self::new(config)?;
        global::install(Arc::clone(&kernel.bus))?;
        tracing::info!("kernel booted");
        Ok(kernel)
    }

    /// The effective configuration.
    #[must_use]
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// The kernel's bus.
    #[must_use]
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// An empty registry using the configured root namespace.
    ///
    /// # Errors
    ///
    /// [`KernelError::Registry`] if the registry cannot be built.
    pub fn registry_for(
        &self,
        owner: ComponentId,
        mask: Capability,
    ) -> Result<(Registry, OwnerToken), KernelError> {
        Ok(Registry::builder(owner)
            .capabilities(mask)
            .root_namespace(self.config.registry.root_namespace.clone())
            .build()?)
    }

    /// Like [`registry_for`](Self::registry_for), seeded with `data`.
    ///
    /// # Errors
    ///
    /// [`KernelError::Registry`] if `data` is not a JSON object.
    pub fn registry_with_data(
        &self,
        owner: ComponentId,
        mask: Capability,
        data: Value,
    ) -> Result<(Registry, OwnerToken), KernelError> {
        Ok(Registry::builder(owner)
            .capabilities(mask)
            .root_namespace(self.config.registry.root_namespace.clone())
            .data(data)
            .build()?)
    }

    /// A component base whose registry follows the kernel config.
    ///
    /// # Errors
    ///
    /// As [`registry_for`](Self::registry_for).
    pub fn component(
        &self,
        id: ComponentId,
        mask: Capability,
    ) -> Result<ComponentBase, KernelError> {
        let (registry, token) = self.registry_for(id.clone(), mask)?;
        Ok(ComponentBase::from_registry(id, registry, token)?)
    }

    /// Initializes `component` against the kernel's bus.
    ///
    /// # Errors
    ///
    /// [`KernelError::Component`] wrapping the initialization failure.
    pub fn initialize(&self, component: &dyn Component) -> Result<(), KernelError> {
        component.initialize(&self.bus)?;
        tracing::debug!(component = %component.id(), "component attached");
        Ok(())
    }

    /// Removes every listener `owner` bound. Returns how many bindings
    /// went away.
    pub fn detach(&self, owner: &ComponentId) -> usize {
        let removed = self.bus.unbind_owner(owner);
        tracing::debug!(component = %owner, removed, "component detached");
        removed
    }

    /// Publishes on the kernel's bus.
    ///
    /// # Errors
    ///
    /// [`KernelError::Event`] as [`EventBus::publish`].
    pub fn publish(&self, event: &Event) -> Result<bool, KernelError> {
        Ok(self.bus.publish(event)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BusConfig, RegistryConfig};
    use serde_json::json;
    use weft_event::{EventError, Flow};
    use weft_registry::RegistryError;

    fn shop() -> Kernel {
        Kernel::new(KernelConfig {
            registry: RegistryConfig {
                root_namespace: "shop".into(),
            },
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn new_rejects_invalid_config() {
        let err = Kernel::new(KernelConfig {
            bus: BusConfig { max_depth: 0 },
            ..Default::default()
        })
        .expect_err("zero depth");
        assert!(matches!(err, KernelError::Config(_)));
    }

    #[test]
    fn bus_uses_configured_depth() {
        let kernel = Kernel::new(KernelConfig {
            bus: BusConfig { max_depth: 3 },
            ..Default::default()
        })
        .unwrap();
        assert_eq!(kernel.bus().max_depth(), 3);
    }

    #[test]
    fn registries_strip_configured_namespace() {
        let kernel = shop();
        let (reg, token) = kernel
            .registry_for(ComponentId::builtin("cart"), Capability::READ)
            .unwrap();
        reg.with_owner(&token)
            .register("shop.items.count", json!(2))
            .unwrap();

        assert_eq!(reg.root_namespace(), "shop");
        assert_eq!(reg.get("items.count").unwrap(), Some(json!(2)));
        // the default namespace is just another segment here
        assert_eq!(reg.get("weft.items.count").unwrap(), None);
    }

    #[test]
    fn registry_with_data_needs_object() {
        let kernel = shop();
        let (reg, _) = kernel
            .registry_with_data(
                ComponentId::builtin("config"),
                Capability::READ,
                json!({"db": {"host": "localhost"}}),
            )
            .unwrap();
        assert_eq!(reg.get("shop.db.host").unwrap(), Some(json!("localhost")));

        let err = kernel
            .registry_with_data(ComponentId::builtin("config"), Capability::READ, json!(1))
            .expect_err("scalar seed");
        assert!(matches!(
            err,
            KernelError::Registry(RegistryError::Initialization(_))
        ));
    }

    #[test]
    fn component_gets_kernel_registry() {
        let kernel = shop();
        let base = kernel
            .component(ComponentId::builtin("session"), Capability::READ)
            .unwrap();
        assert_eq!(base.registry().root_namespace(), "shop");
        assert_eq!(base.registry().owner(), base.id());
    }

    #[test]
    fn detach_removes_component_listeners() {
        let kernel = shop();
        let base = kernel
            .component(ComponentId::builtin("view"), Capability::READ)
            .unwrap();
        kernel
            .bus()
            .bind(
                base.listener("on_render", |_| Ok(Flow::Continue)),
                ["view.render.pre", "view.render.post"],
                false,
            )
            .unwrap();

        assert_eq!(kernel.detach(base.id()), 2);
        assert_eq!(kernel.bus().listener_count(), 0);
    }

    #[test]
    fn publish_wraps_bus_errors() {
        let kernel = shop();
        let err = kernel.publish(&Event::new(" . ")).expect_err("blank topic");
        assert!(matches!(err, KernelError::Event(EventError::InvalidTopic(_))));
        assert!(kernel.publish(&Event::new("app.start")).unwrap());
    }
}
