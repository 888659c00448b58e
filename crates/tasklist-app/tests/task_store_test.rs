//! Integration tests for `TaskStore` backed by in-memory and file tiers.

#![allow(missing_docs, clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use serde_json::json;
use tasklist_app::{ProjectConfig, TaskError, TaskStore, ViewSession};
use tasklist_core::{SortOrder, TaskId, ValidationError, ViewState};
use tasklist_store::{MemoryStore, PersistenceLayer, TASKS_KEY, Tier, TierKind};
use tempfile::TempDir;

fn memory_layer() -> (PersistenceLayer, Arc<MemoryStore>, Arc<MemoryStore>) {
    let remote = Arc::new(MemoryStore::new());
    let local = Arc::new(MemoryStore::new());
    let layer = PersistenceLayer::new(vec![
        Tier::new(TierKind::Remote, remote.clone()),
        Tier::new(TierKind::Local, local.clone()),
    ]);
    (layer, remote, local)
}

#[tokio::test]
async fn added_label_appears_exactly_once() {
    let (layer, _, _) = memory_layer();
    let mut store = TaskStore::new(Vec::new(), layer);

    let longest = "x".repeat(100);
    for label in ["abc", "Write report", longest.as_str(), "  padded label  "] {
        store.add(label, None).unwrap();
        let all = store.fetch_all().await;
        let trimmed = label.trim();
        assert_eq!(all.iter().filter(|r| r.label == trimmed).count(), 1);
    }
}

#[tokio::test]
async fn fetch_all_returns_independent_copies() {
    let (layer, _, _) = memory_layer();
    let mut store = TaskStore::new(TaskStore::demo_records(0), layer);

    let mut first = store.fetch_all().await;
    first[0].label = "Tampered".into();
    first[0].completed = true;
    first.clear();

    let second = store.fetch_all().await;
    assert_eq!(second.len(), 2);
    assert_eq!(second[0].label, "First task");
    assert!(!second[0].completed);
}

#[tokio::test]
async fn toggle_is_its_own_inverse() {
    let (layer, _, _) = memory_layer();
    let mut store = TaskStore::new(TaskStore::demo_records(0), layer);
    let original = store.fetch_all().await[0].clone();

    let once = store.toggle(original.id).unwrap();
    let twice = store.toggle(original.id).unwrap();

    assert_eq!(twice.completed, original.completed);
    assert!(once.updated_at >= original.updated_at);
    assert!(twice.updated_at >= once.updated_at);
}

#[tokio::test]
async fn remove_shrinks_collection_by_one() {
    let (layer, _, _) = memory_layer();
    let mut store = TaskStore::new(TaskStore::demo_records(0), layer);
    let before = store.fetch_all().await;

    let removed = store.remove(TaskId(1)).unwrap();
    assert_eq!(removed.label, "First task");

    let after = store.fetch_all().await;
    assert_eq!(after.len(), before.len() - 1);
    assert!(after.iter().all(|r| r.id != TaskId(1)));
}

#[tokio::test]
async fn import_discards_invalid_entries() {
    let (layer, remote, local) = memory_layer();
    let mut store = TaskStore::new(TaskStore::demo_records(0), layer);

    let imported = store
        .import_items(&json!([{"label": "a"}, {"label": "Valid Task"}, {}]))
        .unwrap();
    assert_eq!(imported, 1);

    let all = store.fetch_all().await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].label, "Valid Task");
    assert!(remote.peek(TASKS_KEY).is_some_and(|raw| raw.contains("Valid Task")));
    assert_eq!(remote.peek(TASKS_KEY), local.peek(TASKS_KEY));
}

#[tokio::test]
async fn due_sort_puts_undated_last() {
    let (layer, _, _) = memory_layer();
    let mut store = TaskStore::new(Vec::new(), layer);
    store.add("Later task", Some("2030-01-01")).unwrap();
    store.add("Earlier task", Some("2020-01-01")).unwrap();
    store.add("Undated task", None).unwrap();

    let view = ViewState {
        sort: SortOrder::Due,
        ..ViewState::default()
    };
    let dues: Vec<_> = store
        .view(&view)
        .into_iter()
        .map(|r| r.due_date)
        .collect();
    assert_eq!(
        dues,
        vec![Some("2020-01-01".to_owned()), Some("2030-01-01".to_owned()), None]
    );
}

#[tokio::test]
async fn mark_all_then_clear_completed_scenario() {
    let (layer, _, _) = memory_layer();
    let mut store = TaskStore::new(TaskStore::demo_records(0), layer);

    assert_eq!(store.mark_all_complete(), 2);
    assert!(store.fetch_all().await.iter().all(|r| r.completed));

    assert_eq!(store.clear_completed(), 2);
    assert!(store.fetch_all().await.is_empty());
}

#[tokio::test]
async fn duplicate_variant_is_rejected() {
    let (layer, _, _) = memory_layer();
    let mut store = TaskStore::new(Vec::new(), layer);
    store.add("Write report", None).unwrap();
    let before = store.fetch_all().await;

    let err = store.add("write report  ", None).unwrap_err();
    assert!(matches!(err, TaskError::Validation(ValidationError::Duplicate)));
    assert_eq!(store.fetch_all().await, before);
}

#[tokio::test]
async fn remote_outage_keeps_local_copy_current() {
    let (layer, remote, local) = memory_layer();
    let mut store = TaskStore::new(Vec::new(), layer);
    store.add("Before outage", None).unwrap();
    store.flush().await;

    remote.set_offline(true);
    store.add("During outage", None).unwrap();
    let all = store.fetch_all().await;

    assert_eq!(all.len(), 2);
    assert!(!store.api_status().enabled);
    assert!(store.storage_status().enabled);
    assert!(local.peek(TASKS_KEY).is_some_and(|raw| raw.contains("During outage")));
}

#[tokio::test]
async fn fetch_all_keeps_initial_state_when_nothing_is_stored() {
    let (layer, _, _) = memory_layer();
    let mut store = TaskStore::new(TaskStore::demo_records(0), layer);
    let all = store.fetch_all().await;
    assert_eq!(all, TaskStore::demo_records(0));
}

#[tokio::test]
async fn configured_workdir_round_trips_between_sessions() {
    let dir = TempDir::with_prefix("tasklist-app-test-").unwrap();
    std::fs::create_dir_all(dir.path().join(".tasklist")).unwrap();
    std::fs::write(
        dir.path().join(".tasklist/config.toml"),
        "[storage.remote]\nlatency_ms = 1\n",
    )
    .unwrap();
    let config = ProjectConfig::from_workdir(dir.path()).unwrap();

    let mut first = TaskStore::new(Vec::new(), config.storage.persistence(dir.path()).unwrap());
    first.add("Survives restart", Some("2030-05-06")).unwrap();
    first.flush().await;

    let layer = config.storage.persistence(dir.path()).unwrap();
    let mut session = ViewSession::load(layer.tier(TierKind::Local).cloned()).await;
    session.set_sort(SortOrder::Due).await;

    let mut second = TaskStore::new(Vec::new(), layer.clone());
    let all = second.fetch_all().await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].due_date.as_deref(), Some("2030-05-06"));

    let restored = ViewSession::load(layer.tier(TierKind::Local).cloned()).await;
    assert_eq!(restored.state().sort, SortOrder::Due);
}
