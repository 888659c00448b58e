//! Dual-tier snapshot persistence with ordered read fallback.

use serde_json::Value;
use tasklist_core::{Millis, TaskRecord, sanitize_entries};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::tier::{Tier, TierKind, TierStatus};

/// Storage key holding the task snapshot.
pub const TASKS_KEY: &str = "tasks";

/// Persists full task snapshots to every enabled tier and reads them back
/// from the first tier (in priority order) that holds a usable one.
#[derive(Debug, Clone)]
pub struct PersistenceLayer {
    tiers: Vec<Tier>,
    key: String,
}

impl PersistenceLayer {
    /// Build a layer from tiers listed in read priority order.
    pub fn new(tiers: Vec<Tier>) -> Self {
        Self {
            tiers,
            key: TASKS_KEY.to_owned(),
        }
    }

    /// Layer without any tier; loads nothing and saves nowhere.
    pub const fn detached() -> Self {
        Self {
            tiers: Vec::new(),
            key: String::new(),
        }
    }

    /// Store snapshots under `key` instead of [`TASKS_KEY`].
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Tier playing `kind`, if configured.
    pub fn tier(&self, kind: TierKind) -> Option<&Tier> {
        self.tiers.iter().find(|tier| tier.kind() == kind)
    }

    /// Read priority order.
    pub fn read_order(&self) -> Vec<TierKind> {
        self.tiers.iter().map(Tier::kind).collect()
    }

    /// Status of the tier playing `kind`; unconfigured tiers report disabled.
    pub fn status(&self, kind: TierKind) -> TierStatus {
        self.tier(kind).map_or_else(
            || TierStatus {
                enabled: false,
                error: Some(format!("{kind} tier is not configured")),
            },
            Tier::status,
        )
    }

    /// Load the freshest usable snapshot.
    ///
    /// Tiers are tried in priority order. A read failure disables that tier.
    /// Corrupt or non-array payloads count as absent. Only the last tier may
    /// contribute an empty snapshot. Returns `None` when no tier has one.
    pub async fn load(&self, now: Millis) -> Option<Vec<TaskRecord>> {
        let last = self.tiers.len().saturating_sub(1);
        for (position, tier) in self.tiers.iter().enumerate() {
            let Some(raw) = tier.read(&self.key).await else {
                continue;
            };
            let Some(records) = decode_snapshot(tier.kind(), &raw, now) else {
                continue;
            };
            if records.is_empty() && position != last {
                debug!(tier = %tier.kind(), "empty snapshot, falling back");
                continue;
            }
            info!(tier = %tier.kind(), count = records.len(), "loaded task snapshot");
            return Some(records);
        }
        None
    }

    /// Write the full snapshot to every enabled tier without waiting.
    ///
    /// Each tier is written from its own task; a failing tier is disabled and
    /// never blocks the others. The returned handle may be dropped.
    pub fn save(&self, records: &[TaskRecord]) -> PendingSave {
        let Ok(runtime) = Handle::try_current() else {
            error!("no async runtime available; snapshot not persisted");
            return PendingSave::default();
        };
        let payload = match serde_json::to_string(records) {
            Ok(payload) => payload,
            Err(err) => {
                error!(error = %err, "failed to serialize task snapshot");
                return PendingSave::default();
            }
        };

        debug!(count = records.len(), bytes = payload.len(), "saving task snapshot");
        let handles = self
            .tiers
            .iter()
            .filter(|tier| tier.is_enabled())
            .map(|tier| {
                let tier = tier.clone();
                let key = self.key.clone();
                let payload = payload.clone();
                runtime.spawn(async move {
                    if tier.write(&key, payload).await {
                        debug!(tier = %tier.kind(), "snapshot written");
                    }
                })
            })
            .collect();
        PendingSave { handles }
    }
}

fn decode_snapshot(kind: TierKind, raw: &str, now: Millis) -> Option<Vec<TaskRecord>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => Some(sanitize_entries(&items, now)),
        Ok(_) => {
            warn!(tier = %kind, "stored snapshot is not an array; ignoring");
            None
        }
        Err(err) => {
            warn!(tier = %kind, error = %err, "stored snapshot is corrupt; ignoring");
            None
        }
    }
}

/// In-flight tier writes started by one [`PersistenceLayer::save`] call.
#[derive(Debug, Default)]
pub struct PendingSave {
    handles: Vec<JoinHandle<()>>,
}

impl PendingSave {
    /// Whether every write has already finished (or none was started).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handles.iter().all(JoinHandle::is_finished)
    }

    /// Wait until every tier write has settled.
    pub async fn settled(self) {
        for handle in self.handles {
            if let Err(err) = handle.await {
                warn!(error = %err, "snapshot write task did not complete");
            }
        }
    }
}
