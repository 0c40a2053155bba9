//! The registry and its access scopes.

use crate::node::{NodeRef, Walk};
use crate::path::{join, split_path, DEFAULT_ROOT_NAMESPACE};
use crate::RegistryError;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use weft_auth::Capability;
use weft_types::ComponentId;

static NEXT_REGISTRY: AtomicU64 = AtomicU64::new(1);

/// Proof of ownership of one registry.
///
/// Minted once by the constructor and handed to the creating
/// component. It is neither `Clone` nor `Copy`; lending it out is the
/// only way to let someone else act as owner.
#[derive(Debug)]
pub struct OwnerToken {
    registry: u64,
}

/// Builds a [`Registry`].
///
/// ```
/// use serde_json::json;
/// use weft_auth::Capability;
/// use weft_registry::Registry;
/// use weft_types::ComponentId;
///
/// let (config, token) = Registry::builder(ComponentId::builtin("config"))
///     .capabilities(Capability::READ)
///     .root_namespace("app")
///     .data(json!({"db": {"host": "localhost"}}))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.get("app.db.host").unwrap(), Some(json!("localhost")));
/// assert!(config.set("db.host", json!("x")).is_err());
/// assert!(config.with_owner(&token).set("db.host", json!("x")).unwrap());
/// ```
#[derive(Debug)]
pub struct RegistryBuilder {
    owner: ComponentId,
    mask: Capability,
    root_namespace: String,
    data: Option<Value>,
}

impl RegistryBuilder {
    /// Mask advertised to non-owners. Defaults to empty (owner only).
    #[must_use]
    pub fn capabilities(mut self, mask: Capability) -> Self {
        self.mask = mask;
        self
    }

    /// Segment stripped from the head of every path.
    #[must_use]
    pub fn root_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.root_namespace = namespace.into();
        self
    }

    /// Initial contents; must be a JSON object.
    #[must_use]
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Creates the registry and its owner token.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Initialization`] if the initial data is not an
    /// object.
    pub fn build(self) -> Result<(Registry, OwnerToken), RegistryError> {
        let root = match self.data {
            None => NodeRef::tree(),
            Some(data @ Value::Object(_)) => NodeRef::new(data),
            Some(other) => {
                return Err(RegistryError::Initialization(format!(
                    "initial data must be an object, got {}",
                    json_kind(&other)
                )))
            }
        };

        Ok(Registry::assemble(
            self.owner,
            self.mask,
            self.root_namespace,
            root,
        ))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A capability-gated hierarchical key/value store.
///
/// Methods called directly on the registry act as a non-owner and are
/// checked against the advertised [`capabilities`](Self::capabilities).
/// The owner goes through [`with_owner`](Self::with_owner), which skips
/// the check.
pub struct Registry {
    id: u64,
    owner: ComponentId,
    mask: Capability,
    root_namespace: String,
    root: RwLock<NodeRef>,
}

impl Registry {
    /// Creates an empty registry owned by `owner`.
    #[must_use]
    pub fn new(owner: ComponentId, mask: Capability) -> (Self, OwnerToken) {
        Self::assemble(owner, mask, DEFAULT_ROOT_NAMESPACE.to_string(), NodeRef::tree())
    }

    fn assemble(
        owner: ComponentId,
        mask: Capability,
        root_namespace: String,
        root: NodeRef,
    ) -> (Self, OwnerToken) {
        let id = NEXT_REGISTRY.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            owner = %owner,
            capabilities = %mask,
            root_namespace = %root_namespace,
            "registry created"
        );
        (
            Self {
                id,
                owner,
                mask,
                root_namespace,
                root: RwLock::new(root),
            },
            OwnerToken { registry: id },
        )
    }

    /// Starts a [`RegistryBuilder`].
    #[must_use]
    pub fn builder(owner: ComponentId) -> RegistryBuilder {
        RegistryBuilder {
            owner,
            mask: Capability::empty(),
            root_namespace: DEFAULT_ROOT_NAMESPACE.to_string(),
            data: None,
        }
    }

    /// Creates a registry from a raw mask.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidCapability`] if `bits` has unknown bits set.
    pub fn from_bits(owner: ComponentId, bits: u16) -> Result<(Self, OwnerToken), RegistryError> {
        let mask = Capability::from_raw(bits)
            .ok_or_else(|| RegistryError::InvalidCapability(format!("{bits:#06x}")))?;
        Self::builder(owner).capabilities(mask).build()
    }

    /// Creates a registry from capability names such as `"READ"` or `"set"`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidCapability`] listing every unknown name.
    pub fn from_names(
        owner: ComponentId,
        names: &[&str],
    ) -> Result<(Self, OwnerToken), RegistryError> {
        let (mask, unknown) = Capability::parse_list(names);
        if !unknown.is_empty() {
            return Err(RegistryError::InvalidCapability(unknown.join(", ")));
        }
        Self::builder(owner).capabilities(mask).build()
    }

    /// Creates a registry pre-filled with `data`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Initialization`] unless `data` is an object.
    pub fn with_data(
        owner: ComponentId,
        mask: Capability,
        data: Value,
    ) -> Result<(Self, OwnerToken), RegistryError> {
        Self::builder(owner).capabilities(mask).data(data).build()
    }

    /// The component that created this registry.
    #[must_use]
    pub fn owner(&self) -> &ComponentId {
        &self.owner
    }

    /// Mask advertised to non-owners.
    #[must_use]
    pub fn capabilities(&self) -> Capability {
        self.mask
    }

    /// Segment stripped from the head of paths.
    #[must_use]
    pub fn root_namespace(&self) -> &str {
        &self.root_namespace
    }

    /// Returns `true` if `token` was minted for this registry.
    #[must_use]
    pub fn is_owned_by(&self, token: &OwnerToken) -> bool {
        token.registry == self.id
    }

    /// Scope acting as owner.
    ///
    /// A token minted for another registry grants nothing; the scope
    /// then behaves like a direct call.
    #[must_use]
    pub fn with_owner(&self, token: &OwnerToken) -> RegistryScope<'_> {
        let owner = self.is_owned_by(token);
        if !owner {
            tracing::debug!(owner = %self.owner, "foreign owner token, falling back to mask");
        }
        RegistryScope {
            registry: self,
            owner,
        }
    }

    fn public(&self) -> RegistryScope<'_> {
        RegistryScope {
            registry: self,
            owner: false,
        }
    }

    /// See [`RegistryScope::exists`].
    ///
    /// # Errors
    ///
    /// As [`RegistryScope::exists`].
    pub fn exists(&self, path: &str) -> Result<bool, RegistryError> {
        self.public().exists(path)
    }

    /// See [`RegistryScope::get`].
    ///
    /// # Errors
    ///
    /// As [`RegistryScope::get`].
    pub fn get(&self, path: &str) -> Result<Option<Value>, RegistryError> {
        self.public().get(path)
    }

    /// See [`RegistryScope::get_as`].
    ///
    /// # Errors
    ///
    /// As [`RegistryScope::get_as`].
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, RegistryError> {
        self.public().get_as(path)
    }

    /// See [`RegistryScope::get_ref`].
    ///
    /// # Errors
    ///
    /// As [`RegistryScope::get_ref`].
    pub fn get_ref(&self, path: &str) -> Result<Option<NodeRef>, RegistryError> {
        self.public().get_ref(path)
    }

    /// See [`RegistryScope::keys`].
    ///
    /// # Errors
    ///
    /// As [`RegistryScope::keys`].
    pub fn keys(&self, path: &str) -> Result<Option<Vec<String>>, RegistryError> {
        self.public().keys(path)
    }

    /// See [`RegistryScope::register`].
    ///
    /// # Errors
    ///
    /// As [`RegistryScope::register`].
    pub fn register(&self, path: &str, value: Value) -> Result<Value, RegistryError> {
        self.public().register(path, value)
    }

    /// See [`RegistryScope::register_ref`].
    ///
    /// # Errors
    ///
    /// As [`RegistryScope::register_ref`].
    pub fn register_ref(&self, path: &str, handle: &NodeRef) -> Result<NodeRef, RegistryError> {
        self.public().register_ref(path, handle)
    }

    /// See [`RegistryScope::set`].
    ///
    /// # Errors
    ///
    /// As [`RegistryScope::set`].
    pub fn set(&self, path: &str, value: Value) -> Result<bool, RegistryError> {
        self.public().set(path, value)
    }

    /// See [`RegistryScope::set_ref`].
    ///
    /// # Errors
    ///
    /// As [`RegistryScope::set_ref`].
    pub fn set_ref(&self, path: &str, handle: &NodeRef) -> Result<bool, RegistryError> {
        self.public().set_ref(path, handle)
    }

    /// See [`RegistryScope::unregister`].
    ///
    /// # Errors
    ///
    /// As [`RegistryScope::unregister`].
    pub fn unregister(&self, path: &str) -> Result<bool, RegistryError> {
        self.public().unregister(path)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("owner", &self.owner)
            .field("capabilities", &self.mask)
            .field("root_namespace", &self.root_namespace)
            .finish_non_exhaustive()
    }
}

/// Registry operations on behalf of one caller.
///
/// Every operation first passes [`weft_auth::authorize`] with the
/// capability it needs, then validates its path, then touches the tree.
/// Nothing is mutated when any of those steps fails.
#[derive(Debug, Clone, Copy)]
pub struct RegistryScope<'a> {
    registry: &'a Registry,
    owner: bool,
}

impl RegistryScope<'_> {
    /// Returns `true` if this scope bypasses the mask.
    #[must_use]
    pub fn is_owner(&self) -> bool {
        self.owner
    }

    fn authorize(&self, required: Capability, operation: &str) -> Result<(), RegistryError> {
        weft_auth::authorize(self.registry.mask, required, self.owner, operation)?;
        Ok(())
    }

    fn segments(&self, path: &str) -> Vec<String> {
        split_path(path, &self.registry.root_namespace)
    }

    /// Segments of a path that must name a leaf.
    fn leaf_segments(&self, path: &str) -> Result<Vec<String>, RegistryError> {
        let segments = self.segments(path);
        if segments.is_empty() {
            return Err(RegistryError::InvalidPath(path.to_string()));
        }
        Ok(segments)
    }

    fn root(&self) -> NodeRef {
        self.registry.root.read().clone()
    }

    fn lookup(&self, segments: &[String]) -> Option<NodeRef> {
        match self.root().walk(segments) {
            Walk::Found(node) => Some(node),
            Walk::Missing { .. } | Walk::Blocked { .. } => None,
        }
    }

    /// Returns `true` if `path` exists. Requires `EXISTS`.
    ///
    /// # Errors
    ///
    /// `PermissionDenied`, or `InvalidPath` for a blank path.
    pub fn exists(&self, path: &str) -> Result<bool, RegistryError> {
        self.authorize(Capability::EXISTS, "exists")?;
        let segments = self.leaf_segments(path)?;
        Ok(self.lookup(&segments).is_some())
    }

    /// Copy of the value at `path`; the whole tree for a blank path.
    /// Requires `GET`.
    ///
    /// # Errors
    ///
    /// `PermissionDenied`.
    pub fn get(&self, path: &str) -> Result<Option<Value>, RegistryError> {
        self.authorize(Capability::GET, "get")?;
        let segments = self.segments(path);
        Ok(self.lookup(&segments).map(|node| node.value()))
    }

    /// Value at `path` deserialized into `T`. Requires `GET`.
    ///
    /// # Errors
    ///
    /// `PermissionDenied`, or `Unexpected` wrapping the deserialization
    /// failure.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, RegistryError> {
        self.authorize(Capability::GET, "get_as")?;
        let segments = self.segments(path);
        self.lookup(&segments)
            .map(|node| {
                serde_json::from_value(node.value())
                    .map_err(|e| RegistryError::unexpected("get_as", e))
            })
            .transpose()
    }

    /// Shared handle to the node at `path`; the root for a blank path.
    /// Requires `GETREF`.
    ///
    /// # Errors
    ///
    /// `PermissionDenied`.
    pub fn get_ref(&self, path: &str) -> Result<Option<NodeRef>, RegistryError> {
        self.authorize(Capability::GETREF, "get_ref")?;
        let segments = self.segments(path);
        Ok(self.lookup(&segments))
    }

    /// Child names under `path`, sorted; `None` if missing or a leaf.
    /// Requires `EXISTS`.
    ///
    /// # Errors
    ///
    /// `PermissionDenied`.
    pub fn keys(&self, path: &str) -> Result<Option<Vec<String>>, RegistryError> {
        self.authorize(Capability::EXISTS, "keys")?;
        let segments = self.segments(path);
        Ok(self.lookup(&segments).and_then(|node| node.keys()))
    }

    /// Get-or-create. Requires `REGISTER`.
    ///
    /// Missing intermediates are created as empty subtrees. An absent
    /// leaf is set to `value`; an existing one is kept. Returns the
    /// value that is stored at `path` afterwards.
    ///
    /// Pass [`Value::Null`] for an explicit empty entry.
    ///
    /// # Errors
    ///
    /// `PermissionDenied`, `InvalidPath` for a blank path, `NotATree`
    /// if a leaf value sits where an intermediate is needed.
    pub fn register(&self, path: &str, value: Value) -> Result<Value, RegistryError> {
        self.authorize(Capability::REGISTER, "register")?;
        let segments = self.leaf_segments(path)?;
        let (node, created) = self.attach(&segments, None, || NodeRef::new(value))?;
        tracing::trace!(owner = %self.registry.owner, path = %join(&segments), created, "register");
        Ok(node.value())
    }

    /// Get-or-create with a shared handle. Requires `REGISTERREF`.
    ///
    /// An absent leaf becomes an alias of `handle`. Returns the handle
    /// stored at `path` afterwards, which is the existing node if there
    /// was one.
    ///
    /// # Errors
    ///
    /// As [`register`](Self::register), plus `Cycle` if `handle`
    /// contains the node it would be stored under.
    pub fn register_ref(&self, path: &str, handle: &NodeRef) -> Result<NodeRef, RegistryError> {
        self.authorize(Capability::REGISTERREF, "register_ref")?;
        let segments = self.leaf_segments(path)?;
        let (node, created) = self.attach(&segments, Some(handle), || handle.clone())?;
        tracing::trace!(owner = %self.registry.owner, path = %join(&segments), created, "register_ref");
        Ok(node)
    }

    fn attach(
        &self,
        segments: &[String],
        link: Option<&NodeRef>,
        make: impl FnOnce() -> NodeRef,
    ) -> Result<(NodeRef, bool), RegistryError> {
        let Some((key, parents)) = segments.split_last() else {
            return Err(RegistryError::InvalidPath(String::new()));
        };
        let root = self.root();

        let deepest = match root.walk(parents) {
            Walk::Found(parent) => {
                if let Some(existing) = parent.child(key) {
                    return Ok((existing, false));
                }
                parent
            }
            Walk::Missing { deepest } => deepest,
            Walk::Blocked { depth } => {
                return Err(RegistryError::NotATree {
                    path: join(&segments[..depth]),
                })
            }
        };

        if let Some(handle) = link {
            if handle.reaches(&deepest) {
                return Err(RegistryError::Cycle {
                    path: join(segments),
                });
            }
        }

        root.vivify(parents)
            .and_then(|parent| parent.insert_absent(key, make))
            .ok_or_else(|| RegistryError::NotATree {
                path: join(parents),
            })
    }

    /// Overwrites the value at `path`. Requires `SET`.
    ///
    /// Every intermediate must already exist as a subtree; otherwise
    /// nothing changes and `false` is returned. An existing leaf is
    /// overwritten in place, so aliases of it see the new value. A blank
    /// path replaces the contents of the whole tree.
    ///
    /// # Errors
    ///
    /// `PermissionDenied`, or `NotATree` when replacing the whole tree
    /// with something other than an object.
    pub fn set(&self, path: &str, value: Value) -> Result<bool, RegistryError> {
        self.authorize(Capability::SET, "set")?;
        let segments = self.segments(path);

        let Some((key, parents)) = segments.split_last() else {
            if !value.is_object() {
                return Err(RegistryError::NotATree {
                    path: String::new(),
                });
            }
            self.root().replace(value);
            tracing::debug!(owner = %self.registry.owner, "registry contents replaced");
            return Ok(true);
        };

        let Some(parent) = self.lookup(parents).filter(NodeRef::is_tree) else {
            tracing::trace!(owner = %self.registry.owner, path = %join(&segments), "set on missing parent");
            return Ok(false);
        };

        match parent.child(key) {
            Some(existing) => existing.replace(value),
            None => {
                parent.insert(key, NodeRef::new(value));
            }
        }
        tracing::trace!(owner = %self.registry.owner, path = %join(&segments), "set");
        Ok(true)
    }

    /// Points the slot at `path` to `handle`. Requires `SETREF`.
    ///
    /// Same parent rule as [`set`](Self::set). A blank path makes
    /// `handle` the new root.
    ///
    /// # Errors
    ///
    /// `PermissionDenied`, `NotATree` when the new root is not a
    /// subtree, `Cycle` if `handle` contains the parent node.
    pub fn set_ref(&self, path: &str, handle: &NodeRef) -> Result<bool, RegistryError> {
        self.authorize(Capability::SETREF, "set_ref")?;
        let segments = self.segments(path);

        let Some((key, parents)) = segments.split_last() else {
            if !handle.is_tree() {
                return Err(RegistryError::NotATree {
                    path: String::new(),
                });
            }
            *self.registry.root.write() = handle.clone();
            tracing::debug!(owner = %self.registry.owner, "registry root relinked");
            return Ok(true);
        };

        let Some(parent) = self.lookup(parents).filter(NodeRef::is_tree) else {
            return Ok(false);
        };
        if handle.reaches(&parent) {
            return Err(RegistryError::Cycle {
                path: join(&segments),
            });
        }

        parent.insert(key, handle.clone());
        tracing::trace!(owner = %self.registry.owner, path = %join(&segments), "set_ref");
        Ok(true)
    }

    /// Removes the leaf at `path`. Requires `UNREGISTER`.
    ///
    /// Returns `true` if something was removed. A blank path names
    /// nothing and returns `false`.
    ///
    /// # Errors
    ///
    /// `PermissionDenied`.
    pub fn unregister(&self, path: &str) -> Result<bool, RegistryError> {
        self.authorize(Capability::UNREGISTER, "unregister")?;
        let segments = self.segments(path);

        let Some((key, parents)) = segments.split_last() else {
            return Ok(false);
        };
        let removed = self
            .lookup(parents)
            .is_some_and(|parent| parent.remove(key));
        tracing::trace!(owner = %self.registry.owner, path = %join(&segments), removed, "unregister");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn owned(mask: Capability) -> (Registry, OwnerToken) {
        Registry::new(ComponentId::new("app", "test"), mask)
    }

    fn is_denied(result: Result<impl fmt::Debug, RegistryError>) -> bool {
        matches!(result, Err(RegistryError::PermissionDenied(_)))
    }

    #[test]
    fn register_is_get_or_create() {
        let (reg, _) = owned(Capability::ALL);
        assert_eq!(reg.register("x/y", json!(5)).unwrap(), json!(5));
        assert_eq!(reg.register("x/y", json!(99)).unwrap(), json!(5));
        assert_eq!(reg.get("x.y").unwrap(), Some(json!(5)));
    }

    #[test]
    fn register_creates_empty_intermediates() {
        let (reg, _) = owned(Capability::ALL);
        reg.register("a.b.c", Value::Null).unwrap();
        assert_eq!(reg.get("").unwrap(), Some(json!({"a": {"b": {"c": null}}})));
        assert_eq!(reg.get("a.b").unwrap(), Some(json!({"c": null})));
    }

    #[test]
    fn register_through_leaf_fails_untouched() {
        let (reg, _) = owned(Capability::ALL);
        reg.register("a", json!(1)).unwrap();
        let err = reg.register("a.b.c", json!(2)).expect_err("a is a leaf");
        assert!(matches!(err, RegistryError::NotATree { ref path } if path == "a"));
        assert_eq!(reg.get("").unwrap(), Some(json!({"a": 1})));
    }

    #[test]
    fn set_requires_existing_parent() {
        let (reg, _) = owned(Capability::ALL);
        assert!(!reg.set("missing/path", json!(1)).unwrap());
        assert!(!reg.exists("missing/path").unwrap());
        assert!(!reg.exists("missing").unwrap());
    }

    #[test]
    fn set_creates_only_the_leaf() {
        let (reg, _) = owned(Capability::ALL);
        reg.register("a", json!({})).unwrap();
        assert!(reg.set("a.b", json!(1)).unwrap());
        assert!(reg.set("a.b", json!(2)).unwrap());
        assert_eq!(reg.get("a").unwrap(), Some(json!({"b": 2})));
    }

    #[test]
    fn set_through_leaf_is_refused() {
        let (reg, _) = owned(Capability::ALL);
        reg.register("a", json!("scalar")).unwrap();
        assert!(!reg.set("a.b", json!(1)).unwrap());
        assert_eq!(reg.get("a").unwrap(), Some(json!("scalar")));
    }

    #[test]
    fn set_blank_path_replaces_tree() {
        let (reg, _) = owned(Capability::ALL);
        reg.register("old", json!(1)).unwrap();
        assert!(reg.set("", json!({"new": {"x": 1}})).unwrap());
        assert!(!reg.exists("old").unwrap());
        assert!(reg.exists("new.x").unwrap());

        let err = reg.set("", json!(3)).expect_err("root must be an object");
        assert!(matches!(err, RegistryError::NotATree { .. }));
    }

    #[test]
    fn round_trip() {
        let (reg, _) = owned(Capability::ALL);
        reg.register("a", json!(7)).unwrap();
        assert_eq!(reg.get("a").unwrap(), Some(json!(7)));
        assert!(reg.unregister("a").unwrap());
        assert!(!reg.exists("a").unwrap());
        assert!(!reg.unregister("a").unwrap());
    }

    #[test]
    fn unregister_blank_removes_nothing() {
        let (reg, _) = owned(Capability::ALL);
        reg.register("a", json!(1)).unwrap();
        assert!(!reg.unregister("").unwrap());
        assert!(!reg.unregister("weft").unwrap());
        assert!(reg.exists("a").unwrap());
    }

    #[test]
    fn blank_leaf_paths_are_invalid() {
        let (reg, _) = owned(Capability::ALL);
        assert!(matches!(reg.exists(" "), Err(RegistryError::InvalidPath(_))));
        assert!(matches!(
            reg.register("./", json!(1)),
            Err(RegistryError::InvalidPath(_))
        ));
        assert!(matches!(
            reg.register_ref("", &NodeRef::tree()),
            Err(RegistryError::InvalidPath(_))
        ));
    }

    #[test]
    fn read_mask_denies_writes_to_non_owner() {
        let (reg, token) = owned(Capability::READ);
        reg.with_owner(&token).register("x", json!(0)).unwrap();

        assert_eq!(reg.get("x").unwrap(), Some(json!(0)));
        assert!(reg.exists("x").unwrap());
        assert!(is_denied(reg.set("x", json!(1))));
        assert!(is_denied(reg.register("y", json!(1))));
        assert!(is_denied(reg.unregister("x")));
        assert!(is_denied(reg.get_ref("x")));

        let owner = reg.with_owner(&token);
        assert!(owner.is_owner());
        assert!(owner.set("x", json!(1)).unwrap());
        assert_eq!(owner.get("x").unwrap(), Some(json!(1)));
    }

    #[test]
    fn empty_mask_is_owner_only() {
        let (reg, token) = owned(Capability::empty());
        assert!(is_denied(reg.exists("x")));
        assert!(is_denied(reg.get("")));
        assert!(reg.with_owner(&token).register("x", json!(1)).is_ok());
        assert!(reg.with_owner(&token).exists("x").unwrap());
    }

    #[test]
    fn denied_call_mutates_nothing() {
        let (reg, token) = owned(Capability::READ);
        let _ = reg.set("", json!({"wiped": true}));
        let _ = reg.register("a.b", json!(1));
        assert_eq!(reg.with_owner(&token).get("").unwrap(), Some(json!({})));
    }

    #[test]
    fn foreign_token_grants_nothing() {
        let (reg, _) = owned(Capability::READ);
        let (_, other_token) = owned(Capability::READ);
        assert!(!reg.is_owned_by(&other_token));

        let scope = reg.with_owner(&other_token);
        assert!(!scope.is_owner());
        assert!(is_denied(scope.set("x", json!(1))));
    }

    #[test]
    fn root_namespace_is_stripped() {
        let (reg, _) = owned(Capability::ALL);
        reg.register("weft.session.id", json!("abc")).unwrap();
        assert_eq!(reg.get("session/id").unwrap(), Some(json!("abc")));
        assert_eq!(reg.get("weft").unwrap(), Some(json!({"session": {"id": "abc"}})));
    }

    #[test]
    fn custom_root_namespace() {
        let (reg, _) = Registry::builder(ComponentId::builtin("config"))
            .capabilities(Capability::ALL)
            .root_namespace("shop")
            .build()
            .unwrap();
        reg.register("shop.cart", json!([])).unwrap();
        assert!(reg.exists("cart").unwrap());
        reg.register("weft.cart", json!(1)).unwrap();
        assert!(reg.exists("weft.cart").unwrap());
        assert_eq!(reg.root_namespace(), "shop");
    }

    #[test]
    fn paths_keep_case() {
        let (reg, _) = owned(Capability::ALL);
        reg.register("Theme", json!("dark")).unwrap();
        assert!(reg.exists("Theme").unwrap());
        assert!(!reg.exists("theme").unwrap());
    }

    #[test]
    fn get_ref_aliases_the_stored_node() {
        let (reg, _) = owned(Capability::ALL);
        reg.register("buffer", json!("")).unwrap();
        let handle = reg.get_ref("buffer").unwrap().expect("exists");

        handle.replace(json!("<p>hi</p>"));
        assert_eq!(reg.get("buffer").unwrap(), Some(json!("<p>hi</p>")));

        assert!(reg.set("buffer", json!("reset")).unwrap());
        assert_eq!(handle.value(), json!("reset"));
    }

    #[test]
    fn get_copies() {
        let (reg, _) = owned(Capability::ALL);
        reg.register("list", json!([1])).unwrap();
        let mut copy = reg.get("list").unwrap().expect("exists");
        copy.as_array_mut().expect("array").push(json!(2));
        assert_eq!(reg.get("list").unwrap(), Some(json!([1])));
    }

    #[test]
    fn register_ref_shares_between_registries() {
        let (session, _) = owned(Capability::ALL);
        let (view, _) = owned(Capability::ALL);

        let shared = NodeRef::new(json!({"user": "ann"}));
        let stored = session.register_ref("current", &shared).unwrap();
        assert!(stored.ptr_eq(&shared));
        view.register_ref("session", &shared).unwrap();

        assert!(session.set("current.user", json!("bob")).unwrap());
        assert_eq!(view.get("session.user").unwrap(), Some(json!("bob")));

        let again = session
            .register_ref("current", &NodeRef::new(json!(0)))
            .unwrap();
        assert!(again.ptr_eq(&shared));
    }

    #[test]
    fn set_ref_relinks_slot() {
        let (reg, _) = owned(Capability::ALL);
        reg.register("slot", json!(1)).unwrap();
        let replacement = NodeRef::new(json!(2));
        assert!(reg.set_ref("slot", &replacement).unwrap());
        replacement.replace(json!(3));
        assert_eq!(reg.get("slot").unwrap(), Some(json!(3)));

        assert!(!reg.set_ref("nope.slot", &replacement).unwrap());
    }

    #[test]
    fn set_ref_blank_path_swaps_root() {
        let (reg, _) = owned(Capability::ALL);
        let root = NodeRef::new(json!({"a": 1}));
        assert!(reg.set_ref("", &root).unwrap());
        assert_eq!(reg.get("a").unwrap(), Some(json!(1)));
        assert!(reg.get_ref("").unwrap().expect("root").ptr_eq(&root));

        let err = reg.set_ref("", &NodeRef::new(json!(1))).expect_err("leaf root");
        assert!(matches!(err, RegistryError::NotATree { .. }));
    }

    #[test]
    fn cycles_are_refused() {
        let (reg, _) = owned(Capability::ALL);
        reg.register("a.b", json!({})).unwrap();
        let a = reg.get_ref("a").unwrap().expect("a");

        let err = reg.set_ref("a.b.loop", &a).expect_err("cycle");
        assert!(matches!(err, RegistryError::Cycle { .. }));
        let err = reg.register_ref("a.b.c.loop", &a).expect_err("cycle");
        assert!(matches!(err, RegistryError::Cycle { .. }));
        assert!(!reg.exists("a.b.c").unwrap());

        let root = reg.get_ref("").unwrap().expect("root");
        assert!(matches!(
            reg.set_ref("a.root", &root),
            Err(RegistryError::Cycle { .. })
        ));
        assert_eq!(reg.get("").unwrap(), Some(json!({"a": {"b": {}}})));
    }

    #[test]
    fn keys_lists_children() {
        let (reg, _) = owned(Capability::ALL);
        reg.register("cfg.b", json!(1)).unwrap();
        reg.register("cfg.a", json!(1)).unwrap();
        assert_eq!(reg.keys("cfg").unwrap(), Some(vec!["a".into(), "b".into()]));
        assert_eq!(reg.keys("cfg.a").unwrap(), None);
        assert_eq!(reg.keys("none").unwrap(), None);
    }

    #[test]
    fn get_as_deserializes() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Db {
            host: String,
            port: u16,
        }

        let (reg, _) = Registry::with_data(
            ComponentId::builtin("config"),
            Capability::READ,
            json!({"db": {"host": "localhost", "port": 5432}}),
        )
        .unwrap();

        let db: Option<Db> = reg.get_as("db").unwrap();
        assert_eq!(
            db,
            Some(Db {
                host: "localhost".into(),
                port: 5432
            })
        );
        assert_eq!(reg.get_as::<Db>("missing").unwrap(), None);

        let err = reg.get_as::<u16>("db.host").expect_err("not a number");
        assert!(matches!(err, RegistryError::Unexpected { .. }));
    }

    #[test]
    fn constructors_validate() {
        let owner = ComponentId::new("app", "x");
        assert!(matches!(
            Registry::with_data(owner.clone(), Capability::ALL, json!([1])),
            Err(RegistryError::Initialization(_))
        ));
        assert!(matches!(
            Registry::from_bits(owner.clone(), 0x100),
            Err(RegistryError::InvalidCapability(_))
        ));
        let (reg, _) = Registry::from_bits(owner.clone(), 0b11).unwrap();
        assert_eq!(reg.capabilities(), Capability::READ);

        let err = Registry::from_names(owner.clone(), &["read", "fly"]).expect_err("unknown");
        assert!(matches!(err, RegistryError::InvalidCapability(ref s) if s == "fly"));
        let (reg, _) = Registry::from_names(owner.clone(), &["READ", "set"]).unwrap();
        assert_eq!(reg.capabilities(), Capability::READ | Capability::SET);
        assert_eq!(reg.owner(), &owner);
    }

    #[test]
    fn registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
        assert_send_sync::<NodeRef>();
    }
}
