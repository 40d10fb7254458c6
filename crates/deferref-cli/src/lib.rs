//! deferref host
//!
//! Bootstraps collaborator bindings from a config file and walks a value
//! through resolve → encode → decode → re-resolve.

#![warn(missing_docs)]

pub mod catalog;
pub mod config;

use anyhow::Context;
use catalog::CatalogCollaborator;
use config::{ConfigError, HostConfig};
use deferref_core::{codec, CollaboratorRegistry, DeferredState, DeferredValue, Format, LocatorKey};
use std::sync::Arc;

/// Member record: numeric id, display name, deferred portrait reference
pub type Member = DeferredValue<u64, String, String>;

/// Bind every configured catalog into `registry`
///
/// Returns the bound keys in config order.
///
/// # Errors
/// Returns the config validation error, if any; nothing is bound then.
pub fn install(
    config: &HostConfig,
    registry: &CollaboratorRegistry<u64, String>,
) -> Result<Vec<LocatorKey>, ConfigError> {
    config.validate()?;
    let mut keys = Vec::with_capacity(config.bindings.len());
    for (index, binding) in config.bindings.iter().enumerate() {
        let key = binding
            .locator_key()
            .map_err(|_| ConfigError::EmptyKey { index })?;
        let catalog = CatalogCollaborator::from_config(binding);
        tracing::info!(key = %key, entries = catalog.len(), "binding catalog");
        registry.bind(key.clone(), Arc::new(catalog));
        keys.push(key);
    }
    Ok(keys)
}

/// Input to [`roundtrip`]
#[derive(Debug, Clone)]
pub struct RoundtripRequest {
    /// Member id
    pub id: u64,
    /// Member display name
    pub name: String,
    /// Locator key stored in the member
    pub key: LocatorKey,
    /// Payload format
    pub format: Format,
}

/// Outcome of [`roundtrip`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundtripReport {
    /// Payload before resolution
    pub unresolved_payload: String,
    /// Payload after resolution
    pub resolved_payload: String,
    /// Resolved deferred field
    pub deferred: String,
    /// State of the member decoded from the resolved payload
    pub decoded_state: DeferredState,
    /// Field re-resolved by a member decoded from the unresolved payload
    pub re_resolved: String,
}

impl RoundtripReport {
    /// Human-readable summary
    #[must_use]
    pub fn generate_text(&self) -> String {
        format!(
            "Unresolved payload:\n  {}\nResolved payload:\n  {}\nDeferred field: {}\nDecoded state: {:?}\nRe-resolved after decode: {}\n",
            self.unresolved_payload.trim_end().replace('\n', "\n  "),
            self.resolved_payload.trim_end().replace('\n', "\n  "),
            self.deferred,
            self.decoded_state,
            self.re_resolved,
        )
    }
}

/// Resolve a member, serialize it, and show the payload survives decoding
///
/// # Errors
/// Fails on resolution or codec errors.
pub async fn roundtrip(
    registry: &CollaboratorRegistry<u64, String>,
    request: RoundtripRequest,
) -> anyhow::Result<RoundtripReport> {
    let member = Member::new(request.id, request.name, request.key);
    let unresolved_payload =
        codec::encode(&member, request.format).context("encoding unresolved member")?;

    let deferred = member
        .deferred_field(registry)
        .await
        .with_context(|| format!("resolving member {}", member.id()))?
        .clone();
    let resolved_payload =
        codec::encode(&member, request.format).context("encoding resolved member")?;

    let decoded: Member =
        codec::decode(&resolved_payload, request.format).context("decoding resolved member")?;

    let fresh: Member =
        codec::decode(&unresolved_payload, request.format).context("decoding unresolved member")?;
    let re_resolved = fresh
        .deferred_field(registry)
        .await
        .context("re-resolving decoded member")?
        .clone();

    Ok(RoundtripReport {
        unresolved_payload,
        resolved_payload,
        deferred,
        decoded_state: decoded.state(),
        re_resolved,
    })
}
