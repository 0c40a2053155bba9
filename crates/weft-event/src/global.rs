//! The process-wide bus.
//!
//! Components that are constructed before the kernel finished booting
//! may already publish lifecycle events. Publishing through this module
//! before a bus is installed is a silent no-op that returns `Ok(false)`.
//! Binding is not: a listener bound to nothing would be lost, so
//! [`bind`] reports [`EventError::NotInstalled`].

use crate::{BindingHandle, Event, EventBus, EventError, IntoTopics, Listener};
use std::sync::{Arc, OnceLock};

static BUS: OnceLock<Arc<EventBus>> = OnceLock::new();

/// Installs `bus` as the process-wide bus.
///
/// # Errors
///
/// [`EventError::Initialization`] if a bus is already installed.
pub fn install(bus: Arc<EventBus>) -> Result<(), EventError> {
    BUS.set(bus)
        .map_err(|_| EventError::Initialization("a global event bus is already installed".into()))?;
    tracing::debug!("global event bus installed");
    Ok(())
}

/// The installed bus, if any.
#[must_use]
pub fn get() -> Option<Arc<EventBus>> {
    BUS.get().cloned()
}

/// Returns `true` once a bus has been installed.
#[must_use]
pub fn is_installed() -> bool {
    BUS.get().is_some()
}

/// Publishes on the installed bus.
///
/// Returns `Ok(false)` without doing anything if no bus is installed.
///
/// # Errors
///
/// Same as [`EventBus::publish`].
pub fn publish(event: &Event) -> Result<bool, EventError> {
    match BUS.get() {
        Some(bus) => bus.publish(event),
        None => {
            tracing::trace!(event = event.name(), "publish before bus installed, ignored");
            Ok(false)
        }
    }
}

/// Binds on the installed bus.
///
/// # Errors
///
/// [`EventError::NotInstalled`] if no bus is installed, otherwise the
/// same as [`EventBus::bind`].
pub fn bind(
    listener: Listener,
    topics: impl IntoTopics,
    once: bool,
) -> Result<BindingHandle, EventError> {
    BUS.get()
        .ok_or(EventError::NotInstalled)?
        .bind(listener, topics, once)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Recorder;

    // The slot is process-wide, so the whole lifecycle lives in one test.
    #[test]
    fn lifecycle() {
        let rec = Recorder::new();

        assert!(!is_installed());
        assert!(get().is_none());
        assert!(!publish(&Event::new("app.boot")).unwrap());
        assert!(matches!(
            bind(rec.listener("early"), "app.boot", false),
            Err(EventError::NotInstalled)
        ));

        let bus = Arc::new(EventBus::new());
        install(Arc::clone(&bus)).unwrap();
        assert!(is_installed());
        assert!(matches!(
            install(Arc::new(EventBus::new())),
            Err(EventError::Initialization(_))
        ));

        bind(rec.listener("boot"), "app.boot", false).unwrap();
        assert!(publish(&Event::new("App.Boot")).unwrap());
        assert_eq!(rec.calls(), ["boot"]);

        let installed = get().expect("installed");
        assert!(Arc::ptr_eq(&installed, &bus));
        assert!(matches!(
            publish(&Event::new("")),
            Err(EventError::InvalidTopic(_))
        ));
    }
}
