//! Collaborator locators
//!
//! A [`CollaboratorLocator`] turns a stored [`LocatorKey`] into the collaborator
//! that is current right now. Values depend on this trait only, so swapping a
//! registry for a test double changes nothing in the value or its payload.

use crate::collaborator::SharedCollaborator;
use crate::error::RegistryError;
use crate::key::LocatorKey;
use crate::registry::CollaboratorRegistry;
use std::fmt;
use std::marker::PhantomData;

/// Resolves a locator key to a live collaborator
pub trait CollaboratorLocator<I, T>: Send + Sync {
    /// Collaborator currently bound under `key`
    ///
    /// # Errors
    /// Returns [`RegistryError::UnboundLocatorKey`] if nothing is bound.
    fn resolve(&self, key: &LocatorKey) -> Result<SharedCollaborator<I, T>, RegistryError>;
}

impl<I, T> CollaboratorLocator<I, T> for CollaboratorRegistry<I, T> {
    #[inline]
    fn resolve(&self, key: &LocatorKey) -> Result<SharedCollaborator<I, T>, RegistryError> {
        self.get(key)
    }
}

impl<I, T, L> CollaboratorLocator<I, T> for &L
where
    L: CollaboratorLocator<I, T> + ?Sized,
{
    #[inline]
    fn resolve(&self, key: &LocatorKey) -> Result<SharedCollaborator<I, T>, RegistryError> {
        (**self).resolve(key)
    }
}

/// Locator backed by the process-wide registry for `(I, T)`
pub struct GlobalLocator<I, T> {
    _marker: PhantomData<fn() -> (I, T)>,
}

impl<I, T> GlobalLocator<I, T> {
    /// Create locator
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<I, T> Default for GlobalLocator<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, T> Clone for GlobalLocator<I, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I, T> Copy for GlobalLocator<I, T> {}

impl<I, T> fmt::Debug for GlobalLocator<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GlobalLocator")
    }
}

impl<I: 'static, T: 'static> CollaboratorLocator<I, T> for GlobalLocator<I, T> {
    fn resolve(&self, key: &LocatorKey) -> Result<SharedCollaborator<I, T>, RegistryError> {
        CollaboratorRegistry::<I, T>::global().get(key)
    }
}

/// Locator that returns one collaborator for every key
///
/// Useful as a test double when the key itself is irrelevant.
pub struct FixedLocator<I, T> {
    collaborator: SharedCollaborator<I, T>,
}

impl<I, T> FixedLocator<I, T> {
    /// Create locator around `collaborator`
    #[inline]
    #[must_use]
    pub fn new(collaborator: SharedCollaborator<I, T>) -> Self {
        Self { collaborator }
    }
}

impl<I, T> fmt::Debug for FixedLocator<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedLocator").finish_non_exhaustive()
    }
}

impl<I, T> CollaboratorLocator<I, T> for FixedLocator<I, T> {
    fn resolve(&self, _key: &LocatorKey) -> Result<SharedCollaborator<I, T>, RegistryError> {
        Ok(self.collaborator.clone())
    }
}
