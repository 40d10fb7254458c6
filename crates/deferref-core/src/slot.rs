//! Exactly-once storage for a deferred field
//!
//! Serializes as the bare resolved value. An unresolved slot is skipped by
//! the owning value, so a present field always deserializes as resolved,
//! even when the value itself encodes as `null`. A missing field falls back
//! to the owner's `default` and stays unresolved.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::future::Future;
use tokio::sync::OnceCell;

/// Deferred field storage
///
/// Concurrent initializers on one slot are serialized: one runs, the rest
/// wait for its outcome. A failed initializer leaves the slot empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeferredSlot<T> {
    cell: OnceCell<T>,
}

impl<T> DeferredSlot<T> {
    #[inline]
    pub(crate) fn empty() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    #[inline]
    pub(crate) fn resolved(value: T) -> Self {
        Self {
            cell: OnceCell::new_with(Some(value)),
        }
    }

    #[inline]
    pub(crate) fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    #[inline]
    pub(crate) fn is_unresolved(&self) -> bool {
        !self.cell.initialized()
    }

    #[inline]
    pub(crate) fn into_inner(self) -> Option<T> {
        self.cell.into_inner()
    }

    pub(crate) async fn get_or_try_init<E, F, Fut>(&self, init: F) -> Result<&T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.cell.get_or_try_init(init).await
    }
}

impl<T> Default for DeferredSlot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Serialize> Serialize for DeferredSlot<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.cell.get() {
            Some(value) => value.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for DeferredSlot<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self::resolved)
    }
}
