//! LocatorKey - serializable name of a collaborator binding
//!
//! A [`LocatorKey`] is plain data. It round-trips through any serde format as
//! a bare string and carries no reference to the collaborator it names.

use crate::error::RegistryError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Name of a collaborator binding
///
/// # Example
/// ```
/// use deferref_core::LocatorKey;
///
/// let key: LocatorKey = "photos.primary".parse().unwrap();
/// assert_eq!(key.as_str(), "photos.primary");
/// assert!("   ".parse::<LocatorKey>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocatorKey(String);

impl LocatorKey {
    /// Create key from any string
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the owned string
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl FromStr for LocatorKey {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(RegistryError::InvalidKey(s.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl Display for LocatorKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LocatorKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for LocatorKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LocatorKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for LocatorKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}
