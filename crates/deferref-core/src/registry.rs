//! Collaborator registry
//!
//! Provides [`CollaboratorRegistry`], a swappable mapping from [`LocatorKey`]
//! to live collaborators, and [`BindingGuard`] for scoped swap-and-restore.
//!
//! A registry is a context object: clones share the same bindings, so it can
//! be handed to whatever code resolves deferred fields. Hosts that want
//! ambient lookup use [`CollaboratorRegistry::global`], one instance per
//! `(I, T)` pair for the lifetime of the process.

use crate::collaborator::SharedCollaborator;
use crate::error::RegistryError;
use crate::key::LocatorKey;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Process-wide registries, keyed by `(I, T)` type pair
static GLOBAL_REGISTRIES: Lazy<DashMap<TypeId, Box<dyn Any + Send + Sync>>> =
    Lazy::new(DashMap::new);

/// Swappable bindings from locator key to collaborator
///
/// Reads take a shared lock; `bind`/`unbind` take the exclusive lock.
/// Collaborator handles are cloned out before any computation runs, so a
/// slow collaborator never blocks rebinding.
pub struct CollaboratorRegistry<I, T> {
    bindings: Arc<RwLock<HashMap<LocatorKey, SharedCollaborator<I, T>>>>,
}

impl<I, T> CollaboratorRegistry<I, T> {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            bindings: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register or overwrite a binding
    ///
    /// Returns the previous collaborator bound under `key`, if any.
    pub fn bind(
        &self,
        key: impl Into<LocatorKey>,
        collaborator: SharedCollaborator<I, T>,
    ) -> Option<SharedCollaborator<I, T>> {
        let key = key.into();
        tracing::debug!(key = %key, "binding collaborator");
        self.bindings.write().insert(key, collaborator)
    }

    /// Remove a binding
    pub fn unbind(&self, key: &str) -> Option<SharedCollaborator<I, T>> {
        tracing::debug!(key, "unbinding collaborator");
        self.bindings.write().remove(key)
    }

    /// Get the collaborator bound under `key`
    ///
    /// # Errors
    /// Returns [`RegistryError::UnboundLocatorKey`] if nothing is bound.
    pub fn get(&self, key: &LocatorKey) -> Result<SharedCollaborator<I, T>, RegistryError> {
        self.bindings
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| RegistryError::UnboundLocatorKey(key.clone()))
    }

    /// Check if `key` is bound
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.bindings.read().contains_key(key)
    }

    /// Bound keys, sorted
    #[must_use]
    pub fn keys(&self) -> Vec<LocatorKey> {
        let mut keys: Vec<_> = self.bindings.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of bindings
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    /// Check if registry has no bindings
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }

    /// Remove all bindings
    pub fn clear(&self) {
        self.bindings.write().clear();
    }

    /// Bind for the lifetime of the returned guard
    ///
    /// Dropping the guard restores the previous collaborator, or removes the
    /// key when there was none.
    ///
    /// # Example
    /// ```
    /// use deferref_core::{CollaboratorRegistry, FnCollaborator, BoxError};
    /// use std::sync::Arc;
    ///
    /// let registry = CollaboratorRegistry::<u64, u64>::new();
    /// {
    ///     let _guard = registry.bind_scoped(
    ///         "double",
    ///         Arc::new(FnCollaborator::new(|n: &u64| Ok::<_, BoxError>(n * 2))),
    ///     );
    ///     assert!(registry.contains("double"));
    /// }
    /// assert!(!registry.contains("double"));
    /// ```
    #[must_use = "the binding is reverted as soon as the guard is dropped"]
    pub fn bind_scoped(
        &self,
        key: impl Into<LocatorKey>,
        collaborator: SharedCollaborator<I, T>,
    ) -> BindingGuard<I, T> {
        let key = key.into();
        let previous = self.bind(key.clone(), collaborator);
        BindingGuard {
            registry: self.clone(),
            key,
            previous,
        }
    }

    /// Check if two handles share the same bindings
    #[inline]
    #[must_use]
    pub fn same_bindings(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.bindings, &other.bindings)
    }
}

impl<I: 'static, T: 'static> CollaboratorRegistry<I, T> {
    /// Process-wide registry for this `(I, T)` pair
    ///
    /// Created empty on first use. The host binds production collaborators
    /// at startup; tests swap them with [`bind_scoped`](Self::bind_scoped).
    #[must_use]
    pub fn global() -> Self {
        let slot = GLOBAL_REGISTRIES
            .entry(TypeId::of::<(I, T)>())
            .or_insert_with(|| Box::new(Self::new()));
        let slot: &(dyn Any + Send + Sync) = slot.value().as_ref();
        match slot.downcast_ref::<Self>() {
            Some(registry) => registry.clone(),
            None => unreachable!("global registry slot is keyed by its own type"),
        }
    }
}

impl<I, T> Clone for CollaboratorRegistry<I, T> {
    fn clone(&self) -> Self {
        Self {
            bindings: Arc::clone(&self.bindings),
        }
    }
}

impl<I, T> Default for CollaboratorRegistry<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, T> fmt::Debug for CollaboratorRegistry<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollaboratorRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

/// Scoped binding that restores the prior state on drop
pub struct BindingGuard<I, T> {
    registry: CollaboratorRegistry<I, T>,
    key: LocatorKey,
    previous: Option<SharedCollaborator<I, T>>,
}

impl<I, T> BindingGuard<I, T> {
    /// Key this guard owns
    #[inline]
    #[must_use]
    pub fn key(&self) -> &LocatorKey {
        &self.key
    }

    /// Check if a collaborator was bound before this guard
    #[inline]
    #[must_use]
    pub fn replaced_existing(&self) -> bool {
        self.previous.is_some()
    }
}

impl<I, T> Drop for BindingGuard<I, T> {
    fn drop(&mut self) {
        let mut bindings = self.registry.bindings.write();
        match self.previous.take() {
            Some(previous) => {
                tracing::debug!(key = %self.key, "restoring previous collaborator");
                bindings.insert(self.key.clone(), previous);
            }
            None => {
                tracing::debug!(key = %self.key, "removing scoped collaborator");
                bindings.remove(&self.key);
            }
        }
    }
}

impl<I, T> fmt::Debug for BindingGuard<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingGuard")
            .field("key", &self.key)
            .field("replaced_existing", &self.replaced_existing())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::{BoxError, FnCollaborator};

    fn constant(value: &'static str) -> SharedCollaborator<u64, String> {
        Arc::new(FnCollaborator::new(move |_: &u64| {
            Ok::<_, BoxError>(value.to_string())
        }))
    }

    #[test]
    fn registry_new_empty() {
        let registry = CollaboratorRegistry::<u64, String>::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn bind_returns_previous() {
        let registry = CollaboratorRegistry::new();
        assert!(registry.bind("a", constant("one")).is_none());
        assert!(registry.bind("a", constant("two")).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn get_unbound_fails() {
        let registry = CollaboratorRegistry::<u64, String>::new();
        let err = registry.get(&LocatorKey::new("missing")).err().expect("expected unbound error");
        assert!(matches!(err, RegistryError::UnboundLocatorKey(k) if k.as_str() == "missing"));
    }

    #[tokio::test]
    async fn get_returns_bound() {
        let registry = CollaboratorRegistry::new();
        registry.bind("a", constant("one"));
        let collab = registry.get(&LocatorKey::new("a")).unwrap();
        assert_eq!(collab.compute(&1).await.unwrap(), "one");
    }

    #[test]
    fn unbind_removes() {
        let registry = CollaboratorRegistry::new();
        registry.bind("a", constant("one"));
        assert!(registry.unbind("a").is_some());
        assert!(!registry.contains("a"));
        assert!(registry.unbind("a").is_none());
    }

    #[test]
    fn keys_sorted() {
        let registry = CollaboratorRegistry::new();
        registry.bind("b", constant("b"));
        registry.bind("a", constant("a"));
        let keys: Vec<_> = registry.keys().into_iter().map(LocatorKey::into_inner).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn clones_share_bindings() {
        let registry = CollaboratorRegistry::new();
        let other = registry.clone();
        other.bind("a", constant("a"));
        assert!(registry.contains("a"));
        assert!(registry.same_bindings(&other));
        assert!(!registry.same_bindings(&CollaboratorRegistry::new()));
    }

    #[tokio::test]
    async fn scoped_binding_restores_previous() {
        let registry = CollaboratorRegistry::new();
        registry.bind("a", constant("prod"));
        {
            let guard = registry.bind_scoped("a", constant("test"));
            assert!(guard.replaced_existing());
            let collab = registry.get(&LocatorKey::new("a")).unwrap();
            assert_eq!(collab.compute(&1).await.unwrap(), "test");
        }
        let collab = registry.get(&LocatorKey::new("a")).unwrap();
        assert_eq!(collab.compute(&1).await.unwrap(), "prod");
    }

    #[test]
    fn scoped_binding_removes_new_key() {
        let registry = CollaboratorRegistry::new();
        {
            let guard = registry.bind_scoped("tmp", constant("x"));
            assert!(!guard.replaced_existing());
            assert_eq!(guard.key().as_str(), "tmp");
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn scoped_binding_restores_on_panic() {
        let registry = CollaboratorRegistry::new();
        let inner = registry.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = inner.bind_scoped("tmp", constant("x"));
            panic!("test body failed");
        }));
        assert!(result.is_err());
        assert!(!registry.contains("tmp"));
    }

    #[test]
    fn global_is_shared_per_type_pair() {
        struct Marker;
        let a = CollaboratorRegistry::<Marker, String>::global();
        let b = CollaboratorRegistry::<Marker, String>::global();
        assert!(a.same_bindings(&b));

        let other = CollaboratorRegistry::<Marker, u32>::global();
        let _guard = a.bind_scoped("global.unit", constant_marker());
        assert!(b.contains("global.unit"));
        assert!(other.is_empty());

        fn constant_marker() -> SharedCollaborator<Marker, String> {
            Arc::new(FnCollaborator::new(|_: &Marker| Ok::<_, BoxError>(String::new())))
        }
    }

    #[test]
    fn debug_lists_keys() {
        let registry = CollaboratorRegistry::new();
        registry.bind("photos", constant("x"));
        assert!(format!("{registry:?}").contains("photos"));
    }
}
