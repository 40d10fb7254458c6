//! Collaborator - the external service behind a deferred field
//!
//! Provides the [`Collaborator`] trait and [`FnCollaborator`], which turns a
//! plain function into a collaborator.

use async_trait::async_trait;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Error returned by a collaborator's computation
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Shared handle to a bound collaborator
pub type SharedCollaborator<I, T> = Arc<dyn Collaborator<I, T>>;

/// Computes a deferred field of type `T` for an identity of type `I`
///
/// Implementations own whatever heavyweight state they need (connections,
/// caches, credentials). None of it ever reaches a serialized value.
#[async_trait]
pub trait Collaborator<I, T>: Send + Sync {
    /// Compute the deferred field for `id`
    async fn compute(&self, id: &I) -> Result<T, BoxError>;
}

/// Collaborator backed by a synchronous function
///
/// # Example
/// ```
/// use deferref_core::FnCollaborator;
///
/// let upper = FnCollaborator::new(|name: &String| {
///     Ok::<_, std::convert::Infallible>(name.to_uppercase())
/// });
/// # let _ = upper;
/// ```
pub struct FnCollaborator<I, T, F> {
    func: F,
    _marker: PhantomData<fn(&I) -> T>,
}

impl<I, T, F> FnCollaborator<I, T, F> {
    /// Wrap a function
    #[inline]
    #[must_use]
    pub fn new<E>(func: F) -> Self
    where
        F: Fn(&I) -> Result<T, E>,
    {
        Self {
            func,
            _marker: PhantomData,
        }
    }
}

impl<I, T, F> fmt::Debug for FnCollaborator<I, T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCollaborator").finish_non_exhaustive()
    }
}

#[async_trait]
impl<I, T, E, F> Collaborator<I, T> for FnCollaborator<I, T, F>
where
    I: Send + Sync,
    T: Send,
    E: Into<BoxError>,
    F: Fn(&I) -> Result<T, E> + Send + Sync,
{
    async fn compute(&self, id: &I) -> Result<T, BoxError> {
        (self.func)(id).map_err(Into::into)
    }
}
