//! Testing utilities for deferref workspace
//!
//! Shared fake collaborators and fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use deferref_core::{BoxError, Collaborator, DeferredValue, LocatorKey};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Value shape used across tests: numeric id, name, photo reference
pub type TestUser = DeferredValue<u64, String, String>;

#[derive(Debug, thiserror::Error)]
pub enum StubError {
    #[error("no stubbed answer for id {0}")]
    Missing(String),

    #[error("injected failure #{0}")]
    Injected(usize),
}

/// Collaborator answering from a fixed table, counting every call
///
/// Carries a `secret` that stands in for internal state (connection strings,
/// credentials) which must never show up in a serialized value.
#[derive(Debug)]
pub struct StubCollaborator<I, T> {
    answers: HashMap<I, T>,
    secret: String,
    delay: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<I>>,
}

impl<I: Hash + Eq, T> StubCollaborator<I, T> {
    pub fn new() -> Self {
        Self {
            answers: HashMap::new(),
            secret: String::new(),
            delay: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_answer(mut self, id: I, value: T) -> Self {
        self.answers.insert(id, value);
        self
    }

    #[must_use]
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = secret.into();
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<I>
    where
        I: Clone,
    {
        self.requests.lock().clone()
    }
}

impl<I: Hash + Eq, T> Default for StubCollaborator<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<I, T> Collaborator<I, T> for StubCollaborator<I, T>
where
    I: Hash + Eq + Clone + Debug + Send + Sync,
    T: Clone + Send + Sync,
{
    async fn compute(&self, id: &I) -> Result<T, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(id.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answers
            .get(id)
            .cloned()
            .ok_or_else(|| StubError::Missing(format!("{id:?}")).into())
    }
}

/// Collaborator that fails a fixed number of times before delegating
#[derive(Debug)]
pub struct FlakyCollaborator<C> {
    inner: C,
    failures_left: AtomicUsize,
    attempts: AtomicUsize,
}

impl<C> FlakyCollaborator<C> {
    pub fn new(inner: C, failures: usize) -> Self {
        Self {
            inner,
            failures_left: AtomicUsize::new(failures),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<I, T, C> Collaborator<I, T> for FlakyCollaborator<C>
where
    I: Send + Sync,
    T: Send,
    C: Collaborator<I, T>,
{
    async fn compute(&self, id: &I) -> Result<T, BoxError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StubError::Injected(attempt).into());
        }
        self.inner.compute(id).await
    }
}

/// Stub answering `PHOTO_<id>` for each id in `ids`
pub fn photo_stub(ids: impl IntoIterator<Item = u64>) -> StubCollaborator<u64, String> {
    ids.into_iter()
        .fold(StubCollaborator::new(), |stub, id| stub.with_answer(id, format!("PHOTO_{id}")))
}

/// Unresolved user with the given id and key
pub fn user(id: u64, key: &str) -> TestUser {
    TestUser::new(id, format!("user-{id}"), LocatorKey::new(key))
}

/// Unique key for tests touching the process-wide registry
pub fn unique_key(prefix: &str) -> LocatorKey {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    LocatorKey::new(format!("{prefix}.{}", NEXT.fetch_add(1, Ordering::SeqCst)))
}

/// Share a collaborator while keeping a typed handle for assertions
pub fn shared<C>(collaborator: C) -> Arc<C> {
    Arc::new(collaborator)
}
