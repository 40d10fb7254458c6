//! deferref Core
//!
//! Serializable values whose expensive field is computed by a collaborator
//! that is looked up by key, never stored.
//!
//! # Overview
//!
//! - [`DeferredValue`]: immutable record with one lazily resolved, cached field
//! - [`LocatorKey`]: plain serializable name of a collaborator binding
//! - [`CollaboratorLocator`]: resolves a key to the current collaborator
//! - [`CollaboratorRegistry`]: swappable key → collaborator bindings
//! - [`codec`]: JSON / YAML round-trip glue
//!
//! # Example
//!
//! ```rust
//! use deferref_core::{CollaboratorRegistry, DeferredValue, FnCollaborator, LocatorKey};
//! use std::sync::Arc;
//!
//! # tokio_test_block(async {
//! let registry = CollaboratorRegistry::<u64, String>::new();
//! registry.bind(
//!     LocatorKey::new("photos"),
//!     Arc::new(FnCollaborator::new(|id: &u64| {
//!         Ok::<_, std::convert::Infallible>(format!("photo-{id}.jpg"))
//!     })),
//! );
//!
//! let user = DeferredValue::new(1_u64, "Alice".to_string(), LocatorKey::new("photos"));
//! let photo = user.deferred_field(&registry).await.unwrap();
//! assert_eq!(photo, "photo-1.jpg");
//!
//! // Only identity, data, key and the resolved field are serialized.
//! let json = serde_json::to_string(&user).unwrap();
//! assert_eq!(json, r#"{"id":1,"data":"Alice","locator":"photos","deferred":"photo-1.jpg"}"#);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

#![warn(missing_docs)]

pub mod codec;
pub mod collaborator;
pub mod error;
pub mod key;
pub mod locator;
pub mod registry;
mod slot;
pub mod value;

// Re-exports
pub use codec::{CodecError, Format};
pub use collaborator::{BoxError, Collaborator, FnCollaborator, SharedCollaborator};
pub use error::{DeferredError, RegistryError};
pub use key::LocatorKey;
pub use locator::{CollaboratorLocator, FixedLocator, GlobalLocator};
pub use registry::{BindingGuard, CollaboratorRegistry};
pub use value::{DeferredState, DeferredValue};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for deferred values
    pub use crate::{
        BindingGuard, Collaborator, CollaboratorLocator, CollaboratorRegistry, DeferredError,
        DeferredState, DeferredValue, FnCollaborator, GlobalLocator, LocatorKey, RegistryError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
