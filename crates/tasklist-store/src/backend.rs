//! Key-value capability shared by every tier, plus in-process backends.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};

/// Minimal storage capability required by a tier.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the backend cannot be read.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the backend cannot be written.
    async fn set(&self, key: &str, value: String) -> StoreResult<()>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: String) -> StoreResult<()> {
        (**self).set(key, value).await
    }
}

/// Process-local map. Can be switched offline to simulate an outage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    offline: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one entry.
    #[must_use]
    pub fn with_entry(key: &str, value: impl Into<String>) -> Self {
        let store = Self::default();
        store.insert(key, value);
        store
    }

    /// Write without going through the async capability.
    pub fn insert(&self, key: &str, value: impl Into<String>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.into());
    }

    /// Read without going through the async capability.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.ensure_online()?;
        Ok(self.peek(key))
    }

    async fn set(&self, key: &str, value: String) -> StoreResult<()> {
        self.ensure_online()?;
        self.insert(key, value);
        Ok(())
    }
}

/// Stand-in for a capability the host does not provide.
#[derive(Debug, Clone)]
pub struct DisabledStore {
    reason: String,
}

impl DisabledStore {
    /// Create a store that always fails with `reason`.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl KeyValueStore for DisabledStore {
    async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }

    async fn set(&self, _key: &str, _value: String) -> StoreResult<()> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }
}

/// Wraps another store and delays every call, simulating a network round-trip.
#[derive(Debug)]
pub struct LatentStore<S> {
    inner: S,
    latency: Duration,
}

impl<S> LatentStore<S> {
    /// Delay each call to `inner` by `latency`.
    pub const fn new(inner: S, latency: Duration) -> Self {
        Self { inner, latency }
    }

    /// Borrow the wrapped store.
    pub const fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: KeyValueStore> KeyValueStore for LatentStore<S> {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        tokio::time::sleep(self.latency).await;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> StoreResult<()> {
        tokio::time::sleep(self.latency).await;
        self.inner.set(key, value).await
    }
}
