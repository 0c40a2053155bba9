//! Test helpers for code that binds to or publishes on an [`EventBus`](crate::EventBus).
//!
//! Enabled in this crate's own tests and, for downstream crates, through
//! the `test-utils` feature.

use crate::{Flow, Listener};
use parking_lot::Mutex;
use std::sync::Arc;

/// Records the order in which labelled listeners ran.
///
/// ```
/// use weft_event::testing::Recorder;
/// use weft_event::{Event, EventBus};
///
/// let bus = EventBus::new();
/// let rec = Recorder::new();
/// bus.bind(rec.listener("app"), "app", false).unwrap();
/// bus.bind(rec.listener("start"), "app.request.start", false).unwrap();
///
/// bus.publish(&Event::new("App/Request/Start")).unwrap();
/// assert_eq!(rec.calls(), ["app", "start"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `label` to the call log.
    pub fn record(&self, label: impl Into<String>) {
        self.calls.lock().push(label.into());
    }

    /// A listener that records `label` and lets dispatch continue.
    #[must_use]
    pub fn listener(&self, label: &str) -> Listener {
        self.with_flow(label, Flow::Continue)
    }

    /// A listener that records `label` and stops dispatch.
    #[must_use]
    pub fn stopper(&self, label: &str) -> Listener {
        self.with_flow(label, Flow::Stop)
    }

    /// A listener that records `label` and fails with `message`.
    #[must_use]
    pub fn failing(&self, label: &str, message: &str) -> Listener {
        let rec = self.clone();
        let label = label.to_string();
        let message = message.to_string();
        Listener::closure(move |_| {
            rec.record(label.clone());
            Err(message.clone().into())
        })
    }

    fn with_flow(&self, label: &str, flow: Flow) -> Listener {
        let rec = self.clone();
        let label = label.to_string();
        Listener::closure(move |_| {
            rec.record(label.clone());
            Ok(flow)
        })
    }

    /// All recorded labels, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// How many times `label` was recorded.
    #[must_use]
    pub fn count(&self, label: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == label).count()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}
