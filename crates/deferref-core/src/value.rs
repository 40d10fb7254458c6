//! DeferredValue - a record with one lazily resolved field
//!
//! Provides [`DeferredValue`], which stores a [`LocatorKey`] instead of a
//! collaborator handle. The collaborator is looked up on first access of the
//! deferred field, and the result is cached for the lifetime of the instance.
//!
//! # Serialization
//!
//! The derived serde impls write exactly `id`, `data`, `locator` and, when
//! resolved, `deferred`. A present `deferred` field decodes as resolved even
//! when it is `null`, and a missing one decodes as unresolved. Deserializing
//! needs no hook: the key round-trips as ordinary data and the next access
//! resolves through a locator again.

use crate::error::DeferredError;
use crate::key::LocatorKey;
use crate::locator::{CollaboratorLocator, GlobalLocator};
use crate::slot::DeferredSlot;
use serde::{Deserialize, Serialize};

/// Resolution state of a deferred field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeferredState {
    /// Not yet computed, or the last attempt failed
    Unresolved,
    /// Computed and cached; terminal
    Resolved,
}

/// Immutable record whose field `T` is computed by a collaborator on demand
///
/// # Type parameters
/// - `I`: identity passed to the collaborator
/// - `D`: primary data, set at construction
/// - `T`: deferred field type
///
/// # Example
/// ```
/// use deferref_core::{DeferredState, DeferredValue, LocatorKey};
///
/// let user = DeferredValue::<u64, String, String>::new(7, "Bob".into(), LocatorKey::new("photos"));
/// assert_eq!(user.state(), DeferredState::Unresolved);
/// assert_eq!(
///     serde_json::to_string(&user).unwrap(),
///     r#"{"id":7,"data":"Bob","locator":"photos"}"#,
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredValue<I, D, T> {
    id: I,
    data: D,
    locator: LocatorKey,
    #[serde(default = "DeferredSlot::empty", skip_serializing_if = "DeferredSlot::is_unresolved")]
    deferred: DeferredSlot<T>,
}

impl<I, D, T> DeferredValue<I, D, T> {
    /// Create unresolved value
    ///
    /// Never touches a registry; an unbound key surfaces on first access.
    #[inline]
    #[must_use]
    pub fn new(id: I, data: D, locator: impl Into<LocatorKey>) -> Self {
        Self {
            id,
            data,
            locator: locator.into(),
            deferred: DeferredSlot::empty(),
        }
    }

    /// Create value with an already computed deferred field
    ///
    /// Used when hydrating from a store that cached the computed field.
    #[inline]
    #[must_use]
    pub fn hydrated(id: I, data: D, locator: impl Into<LocatorKey>, deferred: T) -> Self {
        Self {
            id,
            data,
            locator: locator.into(),
            deferred: DeferredSlot::resolved(deferred),
        }
    }

    /// Identity
    #[inline]
    #[must_use]
    pub fn id(&self) -> &I {
        &self.id
    }

    /// Primary data
    #[inline]
    #[must_use]
    pub fn data(&self) -> &D {
        &self.data
    }

    /// Key naming the collaborator binding
    #[inline]
    #[must_use]
    pub fn locator_key(&self) -> &LocatorKey {
        &self.locator
    }

    /// Cached deferred field, without resolving
    #[inline]
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.deferred.get()
    }

    /// Current resolution state
    #[inline]
    #[must_use]
    pub fn state(&self) -> DeferredState {
        if self.deferred.is_unresolved() {
            DeferredState::Unresolved
        } else {
            DeferredState::Resolved
        }
    }

    /// Check if the deferred field is cached
    #[inline]
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.state() == DeferredState::Resolved
    }

    /// Split into `(id, data, locator, deferred)`
    #[must_use]
    pub fn into_parts(self) -> (I, D, LocatorKey, Option<T>) {
        (self.id, self.data, self.locator, self.deferred.into_inner())
    }
}

impl<I, D, T> DeferredValue<I, D, T>
where
    I: Send + Sync,
    T: Send,
{
    /// Deferred field, resolving through `locator` on first access
    ///
    /// A resolved field is returned as is. Otherwise the collaborator bound
    /// under the stored key computes it from `id`; the result is cached only
    /// on success. Concurrent callers on one instance share a single
    /// in-flight resolution.
    ///
    /// # Errors
    /// - [`DeferredError::UnboundLocatorKey`] if `locator` has no binding
    /// - [`DeferredError::UpstreamComputationFailed`] if the collaborator fails
    pub async fn deferred_field<L>(&self, locator: &L) -> Result<&T, DeferredError>
    where
        L: CollaboratorLocator<I, T> + ?Sized,
    {
        if let Some(cached) = self.deferred.get() {
            tracing::trace!(key = %self.locator, "deferred field cache hit");
            return Ok(cached);
        }

        self.deferred
            .get_or_try_init(|| async {
                tracing::debug!(key = %self.locator, "resolving deferred field");
                let collaborator = locator.resolve(&self.locator)?;
                let value = collaborator
                    .compute(&self.id)
                    .await
                    .map_err(|source| DeferredError::upstream(self.locator.clone(), source))?;
                tracing::debug!(key = %self.locator, "deferred field resolved");
                Ok::<T, DeferredError>(value)
            })
            .await
    }
}

impl<I, D, T> DeferredValue<I, D, T>
where
    I: Send + Sync + 'static,
    T: Send + 'static,
{
    /// Deferred field, resolving through the process-wide registry
    ///
    /// # Errors
    /// Same as [`deferred_field`](Self::deferred_field).
    pub async fn deferred_field_global(&self) -> Result<&T, DeferredError> {
        self.deferred_field(&GlobalLocator::<I, T>::new()).await
    }
}
