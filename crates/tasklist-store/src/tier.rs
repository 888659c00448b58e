//! A storage backend paired with its session health status.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use crate::backend::{DisabledStore, KeyValueStore};
use crate::error::{StoreError, StoreResult};

/// Which persistence tier a backend plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TierKind {
    /// Fast, synchronous, on-device storage.
    Local,
    /// Slow storage reached through a (simulated) network call.
    Remote,
}

impl TierKind {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TierKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" | "api" => Ok(Self::Remote),
            other => Err(StoreError::Other(format!(
                "unknown tier '{other}' (expected local or remote)"
            ))),
        }
    }
}

/// Health of a tier for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierStatus {
    /// Whether the tier is still used.
    pub enabled: bool,
    /// Message of the failure that disabled the tier.
    pub error: Option<String>,
}

impl Default for TierStatus {
    fn default() -> Self {
        Self {
            enabled: true,
            error: None,
        }
    }
}

/// Backend plus shared status. Clones share the same status.
#[derive(Clone)]
pub struct Tier {
    kind: TierKind,
    store: Arc<dyn KeyValueStore>,
    status: Arc<Mutex<TierStatus>>,
}

impl fmt::Debug for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tier")
            .field("kind", &self.kind)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl Tier {
    /// Wrap an enabled backend.
    pub fn new(kind: TierKind, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kind,
            store,
            status: Arc::new(Mutex::new(TierStatus::default())),
        }
    }

    /// A tier whose capability is absent; disabled from the start.
    pub fn unavailable(kind: TierKind, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            kind,
            store: Arc::new(DisabledStore::new(reason.clone())),
            status: Arc::new(Mutex::new(TierStatus {
                enabled: false,
                error: Some(reason),
            })),
        }
    }

    /// Role of this tier.
    #[must_use]
    pub const fn kind(&self) -> TierKind {
        self.kind
    }

    /// Snapshot of the current status.
    #[must_use]
    pub fn status(&self) -> TierStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the tier has not failed yet this session.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.status().enabled
    }

    /// Disable the tier for the rest of the session, keeping the first error.
    pub fn disable(&self, err: &StoreError) {
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        if status.enabled {
            warn!(tier = %self.kind, error = %err, "disabling storage tier for this session");
            status.enabled = false;
            status.error = Some(err.to_string());
        }
    }

    /// Read `key`, disabling the tier on failure. Disabled tiers read nothing.
    pub async fn read(&self, key: &str) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }
        self.guard(self.store.get(key).await).flatten()
    }

    /// Write `key`, disabling the tier on failure. Returns whether the write landed.
    pub async fn write(&self, key: &str, value: String) -> bool {
        if !self.is_enabled() {
            return false;
        }
        self.guard(self.store.set(key, value).await).is_some()
    }

    fn guard<T>(&self, result: StoreResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.disable(&err);
                None
            }
        }
    }
}
