//! In-memory catalog collaborator
//!
//! Stands in for an external service (photo store, profile service). Its
//! connection descriptor is internal state that a value must never carry.

use crate::config::BindingConfig;
use async_trait::async_trait;
use deferref_core::{BoxError, Collaborator};
use std::collections::HashMap;
use std::time::Duration;

/// Catalog lookup errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No entry for the requested id
    #[error("catalog has no entry for id {0}")]
    NotFound(u64),
}

/// Catalog answering deferred fields from a fixed table
#[derive(Debug, Clone)]
pub struct CatalogCollaborator {
    entries: HashMap<u64, String>,
    latency: Duration,
    connection: String,
}

impl CatalogCollaborator {
    /// Build from a binding description
    #[must_use]
    pub fn from_config(binding: &BindingConfig) -> Self {
        Self {
            entries: binding
                .entries
                .iter()
                .map(|entry| (entry.id, entry.value.clone()))
                .collect(),
            latency: Duration::from_millis(binding.latency_ms),
            connection: binding.connection.clone(),
        }
    }

    /// Connection descriptor
    #[inline]
    #[must_use]
    pub fn connection(&self) -> &str {
        &self.connection
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if catalog is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl Collaborator<u64, String> for CatalogCollaborator {
    async fn compute(&self, id: &u64) -> Result<String, BoxError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        tracing::debug!(id, connection = %self.connection, "catalog lookup");
        self.entries
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(*id).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CatalogCollaborator {
        CatalogCollaborator::from_config(
            &BindingConfig::new("catalog.primary")
                .with_entry(1, "portrait-001.jpg")
                .with_entry(2, "portrait-002.jpg"),
        )
    }

    #[tokio::test]
    async fn answers_known_ids() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.compute(&1).await.unwrap(), "portrait-001.jpg");
    }

    #[tokio::test]
    async fn unknown_id_fails() {
        let err = catalog().compute(&42).await.unwrap_err();
        assert_eq!(err.to_string(), "catalog has no entry for id 42");
    }

    #[tokio::test(start_paused = true)]
    async fn honours_latency() {
        let mut binding = BindingConfig::new("slow").with_entry(1, "x");
        binding.latency_ms = 250;
        let catalog = CatalogCollaborator::from_config(&binding);

        let start = tokio::time::Instant::now();
        catalog.compute(&1).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(250));
    }
}
