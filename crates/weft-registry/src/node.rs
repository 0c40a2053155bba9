//! Shared tree nodes.
//!
//! Every slot of a registry tree holds a [`NodeRef`]: a shared handle
//! to either a subtree or a leaf value. Storing the same handle in two
//! places (or handing it out through `get_ref`) makes them aliases; a
//! write through one is seen through the other.
//!
//! Handles can only be filled with plain values from the outside, so
//! the only way to link existing nodes together is `register_ref` /
//! `set_ref`, which refuse links that would make the tree cyclic.

use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub(crate) enum Node {
    Tree(BTreeMap<String, NodeRef>),
    Value(Value),
}

impl Node {
    /// JSON objects become subtrees, recursively; anything else is a leaf.
    fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Tree(
                map.into_iter()
                    .map(|(key, child)| (key, NodeRef::new(child)))
                    .collect(),
            ),
            other => Self::Value(other),
        }
    }
}

/// Shared handle to a registry node.
#[derive(Clone)]
pub struct NodeRef(Arc<RwLock<Node>>);

/// Result of walking a path from some node.
pub(crate) enum Walk {
    /// The full path exists.
    Found(NodeRef),
    /// The path stops existing below `deepest`, a subtree.
    Missing { deepest: NodeRef },
    /// A leaf value sits at `depth` where a subtree was needed.
    Blocked { depth: usize },
}

impl NodeRef {
    /// Creates a detached node holding `value`.
    ///
    /// ```
    /// use serde_json::json;
    /// use weft_registry::NodeRef;
    ///
    /// let node = NodeRef::new(json!({"theme": "dark"}));
    /// assert!(node.is_tree());
    /// assert_eq!(node.value(), json!({"theme": "dark"}));
    /// ```
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(Arc::new(RwLock::new(Node::from_value(value))))
    }

    /// An empty subtree.
    #[must_use]
    pub fn tree() -> Self {
        Self(Arc::new(RwLock::new(Node::Tree(BTreeMap::new()))))
    }

    /// Copies the node out as a plain value.
    #[must_use]
    pub fn value(&self) -> Value {
        match &*self.0.read() {
            Node::Tree(children) => Value::Object(
                children
                    .iter()
                    .map(|(key, child)| (key.clone(), child.value()))
                    .collect::<Map<String, Value>>(),
            ),
            Node::Value(value) => value.clone(),
        }
    }

    /// Replaces the node's content in place; every alias sees the change.
    pub fn replace(&self, value: Value) {
        let node = Node::from_value(value);
        *self.0.write() = node;
    }

    /// Returns `true` if the node is a subtree.
    #[must_use]
    pub fn is_tree(&self) -> bool {
        matches!(&*self.0.read(), Node::Tree(_))
    }

    /// Returns `true` if both handles point to the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Child names of a subtree, sorted; `None` for a leaf.
    #[must_use]
    pub fn keys(&self) -> Option<Vec<String>> {
        match &*self.0.read() {
            Node::Tree(children) => Some(children.keys().cloned().collect()),
            Node::Value(_) => None,
        }
    }

    pub(crate) fn child(&self, key: &str) -> Option<NodeRef> {
        match &*self.0.read() {
            Node::Tree(children) => children.get(key).cloned(),
            Node::Value(_) => None,
        }
    }

    pub(crate) fn walk(&self, segments: &[String]) -> Walk {
        let mut current = self.clone();
        for (depth, segment) in segments.iter().enumerate() {
            if !current.is_tree() {
                return Walk::Blocked { depth };
            }
            match current.child(segment) {
                Some(next) => current = next,
                None => return Walk::Missing { deepest: current },
            }
        }
        Walk::Found(current)
    }

    /// Walks `segments`, creating missing subtrees.
    ///
    /// Callers check the path with [`walk`](Self::walk) first; a leaf in
    /// the way yields `None` and leaves whatever was created so far.
    pub(crate) fn vivify(&self, segments: &[String]) -> Option<NodeRef> {
        let mut current = self.clone();
        for segment in segments {
            let next = match &mut *current.0.write() {
                Node::Tree(children) => children
                    .entry(segment.clone())
                    .or_insert_with(NodeRef::tree)
                    .clone(),
                Node::Value(_) => return None,
            };
            current = next;
        }
        Some(current)
    }

    /// Inserts `child` under `key` unless the key is taken; returns the
    /// node that ends up there. `None` if `self` is a leaf.
    pub(crate) fn insert_absent(
        &self,
        key: &str,
        child: impl FnOnce() -> NodeRef,
    ) -> Option<(NodeRef, bool)> {
        match &mut *self.0.write() {
            Node::Tree(children) => {
                if let Some(existing) = children.get(key) {
                    return Some((existing.clone(), false));
                }
                let node = child();
                children.insert(key.to_string(), node.clone());
                Some((node, true))
            }
            Node::Value(_) => None,
        }
    }

    /// Puts `child` under `key`, replacing the slot. `false` if `self` is
    /// a leaf.
    pub(crate) fn insert(&self, key: &str, child: NodeRef) -> bool {
        match &mut *self.0.write() {
            Node::Tree(children) => {
                children.insert(key.to_string(), child);
                true
            }
            Node::Value(_) => false,
        }
    }

    pub(crate) fn remove(&self, key: &str) -> bool {
        match &mut *self.0.write() {
            Node::Tree(children) => children.remove(key).is_some(),
            Node::Value(_) => false,
        }
    }

    /// Returns `true` if `target` is this node or lies below it.
    pub(crate) fn reaches(&self, target: &NodeRef) -> bool {
        if self.ptr_eq(target) {
            return true;
        }
        match &*self.0.read() {
            Node::Tree(children) => children.values().any(|child| child.reaches(target)),
            Node::Value(_) => false,
        }
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef").field(&self.value()).finish()
    }
}
