//! View preferences kept in the local tier.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tasklist_core::{Filter, SortOrder, ViewState};
use tasklist_store::Tier;
use tracing::{debug, warn};

/// Storage key holding the `{filter, sort}` blob.
pub const PREFERENCES_KEY: &str = "preferences";

#[derive(Debug, Serialize)]
struct StoredPreferences {
    filter: Filter,
    sort: SortOrder,
}

/// Current view state plus the tier its filter and sort are remembered in.
///
/// The search query lives only for the session.
#[derive(Debug, Clone, Default)]
pub struct ViewSession {
    state: ViewState,
    tier: Option<Tier>,
}

impl ViewSession {
    /// Restore filter and sort from `tier`. Unknown or missing values fall
    /// back to their defaults one field at a time.
    pub async fn load(tier: Option<Tier>) -> Self {
        let mut state = ViewState::default();
        let stored = match &tier {
            Some(tier) => tier.read(PREFERENCES_KEY).await,
            None => None,
        };
        if let Some(raw) = stored {
            match serde_json::from_str::<Value>(&raw) {
                Ok(blob) => {
                    state.filter = field(&blob, "filter").unwrap_or_default();
                    state.sort = field(&blob, "sort").unwrap_or_default();
                }
                Err(err) => warn!(error = %err, "stored preferences are corrupt; using defaults"),
            }
        }
        debug!(filter = %state.filter, sort = %state.sort, "view preferences loaded");
        Self { state, tier }
    }

    /// Current view state.
    #[must_use]
    pub const fn state(&self) -> &ViewState {
        &self.state
    }

    /// Replace the search query.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.query = query.into();
    }

    /// Change the completion filter and remember it.
    pub async fn set_filter(&mut self, filter: Filter) {
        self.state.filter = filter;
        self.persist().await;
    }

    /// Change the ordering and remember it.
    pub async fn set_sort(&mut self, sort: SortOrder) {
        self.state.sort = sort;
        self.persist().await;
    }

    async fn persist(&self) {
        let Some(tier) = &self.tier else {
            return;
        };
        let blob = StoredPreferences {
            filter: self.state.filter,
            sort: self.state.sort,
        };
        match serde_json::to_string(&blob) {
            Ok(payload) => {
                tier.write(PREFERENCES_KEY, payload).await;
            }
            Err(err) => warn!(error = %err, "failed to serialize view preferences"),
        }
    }
}

fn field<T: for<'de> Deserialize<'de>>(blob: &Value, name: &str) -> Option<T> {
    blob.get(name)
        .and_then(|value| serde_json::from_value(value.clone()).ok())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;
    use std::sync::Arc;
    use tasklist_store::{MemoryStore, TierKind};

    fn local(store: &Arc<MemoryStore>) -> Tier {
        Tier::new(TierKind::Local, store.clone())
    }

    #[tokio::test]
    async fn missing_blob_uses_defaults() {
        let session = ViewSession::load(Some(local(&Arc::new(MemoryStore::new())))).await;
        assert_eq!(session.state(), &ViewState::default());
    }

    #[tokio::test]
    async fn invalid_fields_fall_back_individually() {
        let store = Arc::new(MemoryStore::with_entry(
            PREFERENCES_KEY,
            r#"{"filter":"done","sort":"due"}"#,
        ));
        let session = ViewSession::load(Some(local(&store))).await;
        assert_eq!(session.state().filter, Filter::All);
        assert_eq!(session.state().sort, SortOrder::Due);
    }

    #[tokio::test]
    async fn corrupt_blob_uses_defaults() {
        let store = Arc::new(MemoryStore::with_entry(PREFERENCES_KEY, "{oops"));
        let session = ViewSession::load(Some(local(&store))).await;
        assert_eq!(session.state(), &ViewState::default());
    }

    #[tokio::test]
    async fn filter_and_sort_persist_but_query_does_not() {
        let store = Arc::new(MemoryStore::new());
        let mut session = ViewSession::load(Some(local(&store))).await;
        session.set_query("report");
        session.set_filter(Filter::Completed).await;
        session.set_sort(SortOrder::Oldest).await;

        let raw = store.peek(PREFERENCES_KEY).unwrap();
        let blob: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(blob, serde_json::json!({"filter": "completed", "sort": "oldest"}));

        let restored = ViewSession::load(Some(local(&store))).await;
        assert_eq!(restored.state().filter, Filter::Completed);
        assert_eq!(restored.state().sort, SortOrder::Oldest);
        assert_eq!(restored.state().query, "");
    }

    #[tokio::test]
    async fn works_without_a_tier() {
        let mut session = ViewSession::load(None).await;
        session.set_filter(Filter::Active).await;
        assert_eq!(session.state().filter, Filter::Active);
    }
}
