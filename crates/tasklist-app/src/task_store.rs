//! Canonical task collection and every operation that reads or mutates it.

use std::sync::Arc;

use serde_json::Value;
use tasklist_core::{
    Clock, ImportError, Millis, SystemClock, TaskId, TaskRecord, ValidationError, ViewState,
    normalize_due_date, project, sanitize_items, validate_label, validate_label_excluding,
};
use tasklist_store::{PendingSave, PersistenceLayer, TierKind, TierStatus};
use thiserror::Error;
use tracing::{debug, info};

/// Errors returned inline by [`TaskStore`] operations.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Label rejected by the validator.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// No record carries the requested id.
    #[error("No item found for id {0}")]
    NotFound(TaskId),
    /// Import payload rejected as a whole.
    #[error(transparent)]
    Import(#[from] ImportError),
    /// Export could not be encoded.
    #[error("failed to serialize tasks: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result alias for task operations.
pub type TaskResult<T> = Result<T, TaskError>;

/// Completion breakdown of the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskCounts {
    /// Every record.
    pub total: usize,
    /// Records not yet completed.
    pub active: usize,
    /// Completed records.
    pub completed: usize,
}

/// Owner of the canonical task collection.
///
/// Mutations run synchronously against the in-memory collection and schedule
/// a full-snapshot save without waiting for it. Reads hand out clones only.
pub struct TaskStore {
    records: Vec<TaskRecord>,
    persistence: PersistenceLayer,
    clock: Arc<dyn Clock>,
    in_flight: Vec<PendingSave>,
}

impl TaskStore {
    /// Create a store holding `initial` until persisted state says otherwise.
    pub fn new(initial: Vec<TaskRecord>, persistence: PersistenceLayer) -> Self {
        Self {
            records: initial,
            persistence,
            clock: Arc::new(SystemClock),
            in_flight: Vec::new(),
        }
    }

    /// Replace the clock used for timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The two starter tasks shown before anything has been persisted.
    #[must_use]
    pub fn demo_records(now: Millis) -> Vec<TaskRecord> {
        let first = TaskRecord::new(TaskId(1), "First task".into(), None, now);
        let mut second = TaskRecord::new(TaskId(2), "Second task".into(), None, now);
        second.completed = true;
        vec![first, second]
    }

    /// Persistence layer shared with this store.
    pub const fn persistence(&self) -> &PersistenceLayer {
        &self.persistence
    }

    /// Refresh from persistence when possible and return a copy of the collection.
    pub async fn fetch_all(&mut self) -> Vec<TaskRecord> {
        self.flush().await;
        if let Some(records) = self.persistence.load(self.now()).await {
            debug!(count = records.len(), "collection refreshed from storage");
            self.records = records;
        }
        self.records.clone()
    }

    /// Validate and append a new task.
    ///
    /// # Errors
    /// Returns [`TaskError::Validation`] when the label is rejected.
    pub fn add(&mut self, label: &str, due_date: Option<&str>) -> TaskResult<TaskRecord> {
        let label = validate_label(label, self.records.iter().map(|r| r.label.as_str()))?;
        let id = TaskId::next_after(self.records.iter().map(|r| r.id));
        let record = TaskRecord::new(id, label, normalize_due_date(due_date), self.now());
        self.records.push(record.clone());
        debug!(%id, "task added");
        self.persist();
        Ok(record)
    }

    /// Flip the completion flag of `id`.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] for an unknown id.
    pub fn toggle(&mut self, id: TaskId) -> TaskResult<TaskRecord> {
        self.update(id, |record| record.completed = !record.completed)
    }

    /// Delete the task `id`.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] for an unknown id.
    pub fn remove(&mut self, id: TaskId) -> TaskResult<TaskRecord> {
        let index = self.position(id)?;
        let removed = self.records.remove(index);
        debug!(%id, "task removed");
        self.persist();
        Ok(removed)
    }

    /// Replace the label of `id`, checked against every other label.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] or [`TaskError::Validation`].
    pub fn rename(&mut self, id: TaskId, label: &str) -> TaskResult<TaskRecord> {
        self.position(id)?;
        let label = validate_label_excluding(label, &self.records, id)?;
        self.update(id, |record| record.label = label)
    }

    /// Set or clear the due date of `id`.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] for an unknown id.
    pub fn set_due_date(&mut self, id: TaskId, due_date: Option<&str>) -> TaskResult<TaskRecord> {
        let due_date = normalize_due_date(due_date);
        self.update(id, |record| record.due_date = due_date)
    }

    /// Complete every open task. Returns the size of the collection.
    pub fn mark_all_complete(&mut self) -> usize {
        let now = self.now();
        let mut changed = 0;
        for record in self.records.iter_mut().filter(|record| !record.completed) {
            record.completed = true;
            record.touch(now);
            changed += 1;
        }
        if changed > 0 {
            self.persist();
        }
        debug!(changed, total = self.records.len(), "marked all complete");
        self.records.len()
    }

    /// Drop every completed task. Returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|record| !record.completed);
        let removed = before - self.records.len();
        if removed > 0 {
            self.persist();
        }
        debug!(removed, "cleared completed tasks");
        removed
    }

    /// Replace the whole collection with sanitized entries from `raw`.
    ///
    /// # Errors
    /// Returns [`TaskError::Import`] and leaves the store untouched when the
    /// payload is not an array or yields no valid task.
    pub fn import_items(&mut self, raw: &Value) -> TaskResult<usize> {
        let records = sanitize_items(raw, self.now())?;
        let imported = records.len();
        self.records = records;
        info!(imported, "imported tasks");
        self.persist();
        Ok(imported)
    }

    /// Parse `text` as JSON and import it.
    ///
    /// # Errors
    /// Unparseable text is reported as [`ImportError::InvalidFormat`].
    pub fn import_json(&mut self, text: &str) -> TaskResult<usize> {
        let raw: Value =
            serde_json::from_str(text).map_err(|_| TaskError::Import(ImportError::InvalidFormat))?;
        self.import_items(&raw)
    }

    /// Copy of the collection in insertion order.
    #[must_use]
    pub fn export_snapshot(&self) -> Vec<TaskRecord> {
        self.records.clone()
    }

    /// Pretty-printed JSON array of the collection.
    ///
    /// # Errors
    /// Returns [`TaskError::Serialize`] if encoding fails.
    pub fn export_json(&self) -> TaskResult<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }

    /// Visible subset for `view`.
    #[must_use]
    pub fn view(&self, view: &ViewState) -> Vec<TaskRecord> {
        project(&self.records, view)
    }

    /// Completion breakdown.
    #[must_use]
    pub fn counts(&self) -> TaskCounts {
        let completed = self.records.iter().filter(|record| record.completed).count();
        TaskCounts {
            total: self.records.len(),
            active: self.records.len() - completed,
            completed,
        }
    }

    /// Status of the local tier.
    #[must_use]
    pub fn storage_status(&self) -> TierStatus {
        self.persistence.status(TierKind::Local)
    }

    /// Status of the remote tier.
    #[must_use]
    pub fn api_status(&self) -> TierStatus {
        self.persistence.status(TierKind::Remote)
    }

    /// Wait for every save issued so far to settle.
    pub async fn flush(&mut self) {
        for pending in std::mem::take(&mut self.in_flight) {
            pending.settled().await;
        }
    }

    fn now(&self) -> Millis {
        self.clock.now_millis()
    }

    fn position(&self, id: TaskId) -> TaskResult<usize> {
        self.records
            .iter()
            .position(|record| record.id == id)
            .ok_or(TaskError::NotFound(id))
    }

    fn update(&mut self, id: TaskId, apply: impl FnOnce(&mut TaskRecord)) -> TaskResult<TaskRecord> {
        let index = self.position(id)?;
        let now = self.now();
        let record = &mut self.records[index];
        apply(record);
        record.touch(now);
        let updated = record.clone();
        self.persist();
        Ok(updated)
    }

    fn persist(&mut self) {
        self.in_flight.retain(|pending| !pending.is_finished());
        self.in_flight.push(self.persistence.save(&self.records));
    }
}
