//! The topic tree and its dispatcher.
//!
//! # Dispatch
//!
//! `publish` takes a snapshot of every binding from the tree root down
//! to the event's node, root-most first and in registration order within
//! a node, then walks that snapshot with the lock released:
//!
//! ```text
//! publish("a/b/c")
//!   snapshot: [a: L1] [a/b: -] [a/b/c: L2, L3]
//!   L1 → Continue
//!   L2 → Stop        ← L3 never runs
//! ```
//!
//! Before each call the entry is re-resolved against the live tree, so
//! a binding removed by an earlier listener in the same dispatch is
//! skipped. Bindings added during dispatch only affect later publishes.
//!
//! # Once bindings
//!
//! A once binding is claimed before it runs. Nested publishes skip a
//! claimed binding, so a once listener that republishes its own topic
//! still runs a single time. The binding is removed only after the
//! listener returned `Ok`; on error or panic the claim is released and
//! the binding stays.

use crate::error::BoxError;
use crate::listener::Callback;
use crate::{Event, EventError, Flow, IntoTopics, Listener, ListenerKey, Topic};
use parking_lot::Mutex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use weft_types::ComponentId;

/// Default limit for publishes nested inside listeners.
pub const DEFAULT_MAX_DEPTH: usize = 32;

struct Binding {
    serial: u64,
    key: ListenerKey,
    once: bool,
    in_flight: bool,
}

#[derive(Default)]
struct TopicNode {
    children: HashMap<String, TopicNode>,
    bindings: Vec<Binding>,
}

impl TopicNode {
    fn vivify(&mut self, segments: &[String]) -> &mut TopicNode {
        segments.iter().fold(self, |node, segment| {
            node.children.entry(segment.clone()).or_default()
        })
    }

    fn find(&self, segments: &[String]) -> Option<&TopicNode> {
        segments
            .iter()
            .try_fold(self, |node, segment| node.children.get(segment))
    }

    fn find_mut(&mut self, segments: &[String]) -> Option<&mut TopicNode> {
        segments
            .iter()
            .try_fold(self, |node, segment| node.children.get_mut(segment))
    }

    /// Removes every binding matching `pred` in this subtree.
    fn remove_where(
        &mut self,
        pred: &impl Fn(&Binding) -> bool,
        removed: &mut HashMap<ListenerKey, usize>,
    ) {
        self.bindings.retain(|b| {
            if pred(b) {
                *removed.entry(b.key.clone()).or_default() += 1;
                false
            } else {
                true
            }
        });
        for child in self.children.values_mut() {
            child.remove_where(pred, removed);
        }
    }
}

struct ListenerSlot {
    callback: Callback,
    refs: usize,
}

#[derive(Default)]
struct BusState {
    root: TopicNode,
    listeners: HashMap<ListenerKey, ListenerSlot>,
    next_serial: u64,
}

impl BusState {
    fn release(&mut self, key: &ListenerKey, count: usize) {
        if count == 0 {
            return;
        }
        if let Some(slot) = self.listeners.get_mut(key) {
            slot.refs = slot.refs.saturating_sub(count);
            if slot.refs == 0 {
                self.listeners.remove(key);
            }
        }
    }
}

struct SnapshotEntry {
    depth: usize,
    serial: u64,
    key: ListenerKey,
    once: bool,
}

/// Returned by [`EventBus::bind`]; pass to [`EventBus::unbind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingHandle {
    key: ListenerKey,
    topics: Vec<Topic>,
}

impl BindingHandle {
    /// Identity of the bound listener.
    #[must_use]
    pub fn key(&self) -> &ListenerKey {
        &self.key
    }

    /// Canonical topics the listener was bound to.
    #[must_use]
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }
}

static NEXT_BUS_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    /// Nested publish count per bus id on this thread.
    static PUBLISH_DEPTH: RefCell<HashMap<u64, usize>> = RefCell::new(HashMap::new());
}

/// Hierarchical topic-based event bus.
///
/// All methods take `&self`; the bus is meant to be shared behind an
/// `Arc` by every component of a request.
///
/// Listeners run on the publishing thread, so the nesting limit is
/// counted per thread: unrelated publishes from other threads never
/// count against each other.
pub struct EventBus {
    state: Mutex<BusState>,
    id: u64,
    max_depth: usize,
}

impl EventBus {
    /// Creates an empty bus with [`DEFAULT_MAX_DEPTH`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BusState::default()),
            id: NEXT_BUS_ID.fetch_add(1, Ordering::Relaxed),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Creates an empty bus allowing `max_depth` nested publishes.
    ///
    /// # Errors
    ///
    /// [`EventError::Initialization`] if `max_depth` is zero.
    pub fn with_max_depth(max_depth: usize) -> Result<Self, EventError> {
        if max_depth == 0 {
            return Err(EventError::Initialization(
                "max_depth must be at least 1".into(),
            ));
        }
        Ok(Self {
            max_depth,
            ..Self::new()
        })
    }

    /// Configured nesting limit.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Binds `listener` to every topic in `topics`.
    ///
    /// Missing nodes are created along the way. If a binding with the
    /// same [`ListenerKey`] already sits on a topic's node, that topic is
    /// left as is; the callback stored for the key is replaced by the
    /// newest one either way.
    ///
    /// # Errors
    ///
    /// [`EventError::NoTopics`] or [`EventError::InvalidTopic`]; nothing
    /// is bound in that case.
    pub fn bind(
        &self,
        listener: Listener,
        topics: impl IntoTopics,
        once: bool,
    ) -> Result<BindingHandle, EventError> {
        let topics = topics.into_topics()?;
        let (key, callback) = listener.into_parts();

        let mut guard = self.state.lock();
        let state = &mut *guard;
        let mut added = 0;

        for topic in &topics {
            let node = state.root.vivify(topic.segments());
            if node.bindings.iter().any(|b| b.key == key) {
                tracing::trace!(topic = %topic, listener = %key, "already bound");
                continue;
            }
            node.bindings.push(Binding {
                serial: state.next_serial,
                key: key.clone(),
                once,
                in_flight: false,
            });
            state.next_serial += 1;
            added += 1;
            tracing::trace!(topic = %topic, listener = %key, once, "bound");
        }

        let slot = state
            .listeners
            .entry(key.clone())
            .or_insert_with(|| ListenerSlot {
                callback: callback.clone(),
                refs: 0,
            });
        slot.callback = callback;
        slot.refs += added;

        Ok(BindingHandle { key, topics })
    }

    /// Removes the handle's listener from the handle's topics.
    ///
    /// Returns how many bindings were removed; 0 if they were already
    /// gone (fired once bindings, an earlier unbind).
    pub fn unbind(&self, handle: &BindingHandle) -> usize {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let mut removed = 0;

        for topic in &handle.topics {
            if let Some(node) = state.root.find_mut(topic.segments()) {
                let before = node.bindings.len();
                node.bindings.retain(|b| b.key != handle.key);
                removed += before - node.bindings.len();
            }
        }
        state.release(&handle.key, removed);

        tracing::debug!(listener = %handle.key, removed, "unbound");
        removed
    }

    /// Removes every method binding owned by `owner`, on any topic.
    ///
    /// Returns the number of bindings removed.
    pub fn unbind_owner(&self, owner: &ComponentId) -> usize {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let mut removed = HashMap::new();

        state
            .root
            .remove_where(&|b: &Binding| b.key.owner() == Some(owner), &mut removed);

        let mut total = 0;
        for (key, count) in removed {
            state.release(&key, count);
            total += count;
        }

        tracing::debug!(owner = %owner, removed = total, "unbound owner");
        total
    }

    /// Returns `true` if a node exists for `topic`.
    ///
    /// A blank topic has no node.
    #[must_use]
    pub fn has_topic(&self, topic: &str) -> bool {
        let Ok(topic) = Topic::parse(topic) else {
            return false;
        };
        self.state.lock().root.find(topic.segments()).is_some()
    }

    /// Number of bindings on exactly `topic`'s node (ancestors excluded).
    #[must_use]
    pub fn bindings_on(&self, topic: &str) -> usize {
        let Ok(topic) = Topic::parse(topic) else {
            return 0;
        };
        self.state
            .lock()
            .root
            .find(topic.segments())
            .map_or(0, |node| node.bindings.len())
    }

    /// Number of distinct listener identities currently bound anywhere.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.state.lock().listeners.len()
    }

    /// Publishes `event` to its topic and every ancestor topic.
    ///
    /// Returns `Ok(true)` once dispatch ran, including when nothing was
    /// bound. A listener returning [`Flow::Stop`] ends dispatch early and
    /// is not an error.
    ///
    /// # Errors
    ///
    /// - [`EventError::InvalidTopic`] for a blank event name, before the
    ///   tree is touched.
    /// - [`EventError::DepthExceeded`] when called from listeners nested
    ///   deeper than [`max_depth`](Self::max_depth).
    /// - [`EventError::Unexpected`] wrapping the first listener failure;
    ///   later bindings do not run.
    pub fn publish(&self, event: &Event) -> Result<bool, EventError> {
        let topic = event.topic()?;
        let _depth = self.enter()?;

        let snapshot = self.snapshot(&topic);
        tracing::debug!(topic = %topic, bindings = snapshot.len(), "publish");

        for entry in snapshot {
            let segments = &topic.segments()[..entry.depth];
            let Some(callback) = self.resolve(segments, &entry) else {
                tracing::trace!(topic = %topic, listener = %entry.key, "skipping unbound listener");
                continue;
            };

            let claim = OnceClaim {
                bus: self,
                segments,
                serial: entry.serial,
                key: &entry.key,
                armed: entry.once,
            };

            match callback(event) {
                Ok(flow) => {
                    claim.complete();
                    if flow == Flow::Stop {
                        tracing::debug!(topic = %topic, listener = %entry.key, "propagation stopped");
                        return Ok(true);
                    }
                }
                Err(source) => {
                    drop(claim);
                    return Err(self.listener_failed(&topic, &entry.key, source));
                }
            }
        }

        Ok(true)
    }

    fn listener_failed(&self, topic: &Topic, key: &ListenerKey, source: BoxError) -> EventError {
        tracing::warn!(topic = %topic, listener = %key, error = %source, "listener failed");
        EventError::Unexpected {
            topic: topic.to_string(),
            listener: key.to_string(),
            source,
        }
    }

    fn enter(&self) -> Result<DepthGuard, EventError> {
        let depth = PUBLISH_DEPTH.with(|depths| {
            let mut depths = depths.borrow_mut();
            let current = depths.entry(self.id).or_insert(0);
            *current += 1;
            *current
        });
        let guard = DepthGuard { bus: self.id };
        if depth > self.max_depth {
            drop(guard);
            tracing::warn!(depth, max_depth = self.max_depth, "publish depth exceeded");
            return Err(EventError::DepthExceeded {
                depth,
                max_depth: self.max_depth,
            });
        }
        Ok(guard)
    }

    /// Vivifies `topic` and collects bindings root-most first.
    fn snapshot(&self, topic: &Topic) -> Vec<SnapshotEntry> {
        let mut state = self.state.lock();
        state.root.vivify(topic.segments());

        let mut entries = Vec::new();
        let mut node = Some(&state.root);
        for depth in 0..=topic.depth() {
            let Some(current) = node else { break };
            entries.extend(
                current
                    .bindings
                    .iter()
                    .filter(|b| !(b.once && b.in_flight))
                    .map(|b| SnapshotEntry {
                        depth,
                        serial: b.serial,
                        key: b.key.clone(),
                        once: b.once,
                    }),
            );
            node = topic
                .segments()
                .get(depth)
                .and_then(|segment| current.children.get(segment));
        }
        entries
    }

    /// Looks the entry up in the live tree and claims it if it is once.
    fn resolve(&self, segments: &[String], entry: &SnapshotEntry) -> Option<Callback> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let binding = state
            .root
            .find_mut(segments)?
            .bindings
            .iter_mut()
            .find(|b| b.serial == entry.serial)?;
        if binding.once && binding.in_flight {
            return None;
        }
        let callback = state.listeners.get(&entry.key)?.callback.clone();
        if binding.once {
            binding.in_flight = true;
        }
        Some(callback)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

/// One level of publish nesting on the current thread.
struct DepthGuard {
    bus: u64,
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        let _ = PUBLISH_DEPTH.try_with(|depths| {
            let mut depths = depths.borrow_mut();
            if let Some(current) = depths.get_mut(&self.bus) {
                *current -= 1;
                if *current == 0 {
                    depths.remove(&self.bus);
                }
            }
        });
    }
}

/// Claim on a once binding for the duration of one call.
///
/// Dropped without [`complete`](Self::complete), it hands the binding
/// back so a later publish can run it again.
struct OnceClaim<'a> {
    bus: &'a EventBus,
    segments: &'a [String],
    serial: u64,
    key: &'a ListenerKey,
    armed: bool,
}

impl OnceClaim<'_> {
    fn complete(mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;

        let mut guard = self.bus.state.lock();
        let state = &mut *guard;
        let Some(node) = state.root.find_mut(self.segments) else {
            return;
        };
        let Some(pos) = node.bindings.iter().position(|b| b.serial == self.serial) else {
            return;
        };
        node.bindings.remove(pos);
        state.release(self.key, 1);
    }
}

impl Drop for OnceClaim<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.bus.state.lock();
        if let Some(binding) = state
            .root
            .find_mut(self.segments)
            .and_then(|node| node.bindings.iter_mut().find(|b| b.serial == self.serial))
        {
            binding.in_flight = false;
        }
    }
}
