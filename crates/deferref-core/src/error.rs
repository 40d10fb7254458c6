//! Error types for deferred resolution
//!
//! Provides error handling for:
//! - Registry lookups (unbound or malformed keys)
//! - Deferred field resolution (missing binding, upstream failure)

use crate::collaborator::BoxError;
use crate::key::LocatorKey;

/// Registry errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No collaborator bound under this key
    #[error("no collaborator bound for locator key '{0}'")]
    UnboundLocatorKey(LocatorKey),

    /// Key is empty or blank
    #[error("invalid locator key: '{0}'")]
    InvalidKey(String),
}

/// Deferred field resolution errors
#[derive(Debug, thiserror::Error)]
pub enum DeferredError {
    /// No collaborator bound for the value's stored key
    #[error("collaborator unavailable: no binding for locator key '{0}'")]
    UnboundLocatorKey(LocatorKey),

    /// Collaborator computation failed
    #[error("upstream computation failed via '{key}': {source}")]
    UpstreamComputationFailed {
        /// Key the collaborator was resolved from
        key: LocatorKey,
        /// The collaborator's own error
        #[source]
        source: BoxError,
    },

    /// Key is empty or blank
    #[error("invalid locator key: '{0}'")]
    InvalidKey(String),
}

impl DeferredError {
    /// Check if a plain retry may succeed
    ///
    /// An unbound key needs a `bind` first; upstream failures may be transient.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamComputationFailed { .. })
    }

    /// Key involved in the failure, if it was a valid key
    #[inline]
    #[must_use]
    pub fn key(&self) -> Option<&LocatorKey> {
        match self {
            Self::UnboundLocatorKey(key) | Self::UpstreamComputationFailed { key, .. } => Some(key),
            Self::InvalidKey(_) => None,
        }
    }

    /// Create upstream failure error
    #[inline]
    pub fn upstream(key: LocatorKey, source: impl Into<BoxError>) -> Self {
        Self::UpstreamComputationFailed {
            key,
            source: source.into(),
        }
    }
}

impl From<RegistryError> for DeferredError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnboundLocatorKey(key) => Self::UnboundLocatorKey(key),
            RegistryError::InvalidKey(raw) => Self::InvalidKey(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn unbound_is_not_retryable() {
        let err = DeferredError::UnboundLocatorKey(LocatorKey::new("k"));
        assert!(!err.is_retryable());
        assert_eq!(err.key().map(LocatorKey::as_str), Some("k"));
    }

    #[test]
    fn upstream_keeps_source() {
        let err = DeferredError::upstream(LocatorKey::new("k"), "flaky backend");
        assert!(err.is_retryable());
        assert_eq!(err.source().map(ToString::to_string), Some("flaky backend".into()));
        assert!(err.to_string().contains("flaky backend"));
    }

    #[test]
    fn registry_error_converts() {
        let err: DeferredError = RegistryError::UnboundLocatorKey(LocatorKey::new("k")).into();
        assert!(matches!(err, DeferredError::UnboundLocatorKey(_)));
    }

    #[test]
    fn invalid_key_converts_without_a_key() {
        let err: DeferredError = RegistryError::InvalidKey("  ".into()).into();
        assert!(matches!(err, DeferredError::InvalidKey(ref raw) if raw == "  "));
        assert_eq!(err.key(), None);
        assert!(!err.is_retryable());
    }
}
