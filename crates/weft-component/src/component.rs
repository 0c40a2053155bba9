//! The seam between the kernel and framework components.

use crate::{ComponentBase, ComponentError};
use weft_event::{EventBus, EventError};
use weft_registry::Registry;
use weft_types::ComponentId;

/// A framework component: something with a [`ComponentBase`] that
/// binds its listeners once during initialization.
///
/// # Example
///
/// ```
/// use weft_component::{Component, ComponentBase};
/// use weft_event::{EventBus, EventError, Flow};
/// use weft_registry::Capability;
/// use weft_types::ComponentId;
///
/// struct Router {
///     base: ComponentBase,
/// }
///
/// impl Component for Router {
///     fn base(&self) -> &ComponentBase {
///         &self.base
///     }
///
///     fn bind(&self, bus: &EventBus) -> Result<(), EventError> {
///         let on_start = self.base.listener("on_start", |_| Ok(Flow::Continue));
///         bus.bind(on_start, "app.request.start", false)?;
///         Ok(())
///     }
/// }
///
/// let bus = EventBus::new();
/// let router = Router {
///     base: ComponentBase::new(ComponentId::builtin("router"), Capability::READ),
/// };
/// router.initialize(&bus).unwrap();
/// assert_eq!(bus.bindings_on("app.request.start"), 1);
/// assert!(router.initialize(&bus).is_err());
/// ```
pub trait Component: Send + Sync {
    /// Shared component state.
    fn base(&self) -> &ComponentBase;

    /// Registers the component's listeners on `bus`.
    ///
    /// Called exactly once, between `<name>.init.pre` and
    /// `<name>.init.post`.
    ///
    /// # Errors
    ///
    /// Any bind failure; initialization is then aborted.
    fn bind(&self, bus: &EventBus) -> Result<(), EventError>;

    /// The component's identity.
    fn id(&self) -> &ComponentId {
        self.base().id()
    }

    /// The component's registry as others see it.
    fn registry(&self) -> &Registry {
        self.base().registry()
    }

    /// Runs [`ComponentBase::initialize`] with [`bind`](Self::bind).
    ///
    /// # Errors
    ///
    /// As [`ComponentBase::initialize`].
    fn initialize(&self, bus: &EventBus) -> Result<(), ComponentError> {
        self.base().initialize(bus, |bus| self.bind(bus))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use weft_event::testing::Recorder;
    use weft_event::{Event, Flow};
    use weft_registry::Capability;

    /// Counts requests into its own registry; others may only read.
    struct Counter {
        base: Arc<ComponentBase>,
    }

    impl Counter {
        fn new() -> Self {
            let base = ComponentBase::new(ComponentId::new("app", "counter"), Capability::READ);
            base.owned().register("hits", json!(0)).unwrap();
            Self {
                base: Arc::new(base),
            }
        }
    }

    impl Component for Counter {
        fn base(&self) -> &ComponentBase {
            &self.base
        }

        fn bind(&self, bus: &EventBus) -> Result<(), EventError> {
            let base = Arc::clone(&self.base);
            let listener = self.base.listener("on_request", move |_| {
                let hits = base.owned().get_as::<u64>("hits")?.unwrap_or(0);
                base.owned().set("hits", json!(hits + 1))?;
                Ok(Flow::Continue)
            });
            bus.bind(listener, "app.request", false)?;
            Ok(())
        }
    }

    #[test]
    fn listener_updates_owned_registry() {
        let bus = EventBus::new();
        let counter = Counter::new();
        counter.initialize(&bus).unwrap();

        bus.publish(&Event::new("app.request.start")).unwrap();
        bus.publish(&Event::new("app.request.end")).unwrap();

        assert_eq!(counter.registry().get("hits").unwrap(), Some(json!(2)));
        assert!(counter.registry().set("hits", json!(0)).is_err());
    }

    #[test]
    fn init_topics_surround_bind() {
        let bus = EventBus::new();
        let rec = Recorder::new();
        bus.bind(rec.listener("pre"), "counter.init.pre", false).unwrap();
        bus.bind(rec.listener("post"), "counter.init.post", false).unwrap();

        let counter = Counter::new();
        counter.initialize(&bus).unwrap();
        assert_eq!(rec.calls(), ["pre", "post"]);
        assert_eq!(bus.bindings_on("app.request"), 1);
        assert_eq!(counter.id().name, "counter");
    }
}
