//! Best-effort reconstruction of task records from loosely shaped JSON.
//!
//! Entries must carry a label that passes the length rules; duplicates are
//! not checked here. Used both for user imports and for snapshots read back
//! from storage, so older or hand-edited payloads still load with missing
//! fields back-filled.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::id::TaskId;
use crate::record::{Millis, TaskRecord};
use crate::validate::{normalize_due_date, validate_label};

/// Reasons an import payload is rejected as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    /// Payload is not a JSON array.
    #[error("Invalid import format")]
    InvalidFormat,
    /// Every entry was discarded during sanitization.
    #[error("No valid tasks found in import")]
    NoValidTasks,
}

/// Sanitize an import payload.
///
/// # Errors
/// Returns [`ImportError::InvalidFormat`] for non-array input and
/// [`ImportError::NoValidTasks`] when no entry survives.
pub fn sanitize_items(raw: &Value, now: Millis) -> Result<Vec<TaskRecord>, ImportError> {
    let Value::Array(items) = raw else {
        return Err(ImportError::InvalidFormat);
    };
    let records = sanitize_entries(items, now);
    if records.is_empty() {
        return Err(ImportError::NoValidTasks);
    }
    Ok(records)
}

/// Rebuild every usable entry, discarding the rest.
///
/// Identifiers that repeat an earlier survivor are reassigned past the
/// largest identifier in the batch.
#[must_use]
pub fn sanitize_entries(items: &[Value], now: Millis) -> Vec<TaskRecord> {
    let mut records: Vec<TaskRecord> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match item {
            Value::Object(fields) => sanitize_entry(index, fields, now),
            _ => None,
        })
        .collect();

    let mut next = TaskId::next_after(records.iter().map(|record| record.id));
    let mut seen = BTreeSet::new();
    for record in &mut records {
        if !seen.insert(record.id) {
            record.id = next;
            seen.insert(next);
            next = TaskId(next.0.saturating_add(1));
        }
    }
    records
}

fn sanitize_entry(index: usize, fields: &Map<String, Value>, now: Millis) -> Option<TaskRecord> {
    let label = fields
        .get("label")
        .and_then(Value::as_str)
        .and_then(|label| validate_label(label, std::iter::empty()).ok())?;

    let fallback_id = u64::try_from(index).unwrap_or(u64::MAX - 1) + 1;
    let id = fields.get("id").and_then(positive_id).unwrap_or(fallback_id);
    let created_at = fields.get("createdAt").and_then(finite_millis).unwrap_or(now);
    let updated_at = fields
        .get("updatedAt")
        .and_then(finite_millis)
        .unwrap_or(created_at)
        .max(created_at);
    let due_date = normalize_due_date(fields.get("dueDate").and_then(Value::as_str));

    Some(TaskRecord {
        id: TaskId(id),
        label,
        completed: fields.get("completed").is_some_and(truthy),
        created_at,
        updated_at,
        due_date,
    })
}

const MAX_STORED_ID_F64: f64 = 9_007_199_254_740_991.0;

/// Positive id no larger than [`TaskId::MAX_STORED`]; anything else is
/// treated as missing.
fn positive_id(value: &Value) -> Option<u64> {
    if let Some(id) = value.as_u64() {
        return (1..=TaskId::MAX_STORED.get()).contains(&id).then_some(id);
    }
    let float = value
        .as_f64()
        .map(f64::trunc)
        .filter(|f| (1.0..=MAX_STORED_ID_F64).contains(f))?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(float as u64)
}

fn finite_millis(value: &Value) -> Option<Millis> {
    if let Some(ms) = value.as_i64() {
        return Some(ms);
    }
    let float = value.as_f64().filter(|f| f.is_finite())?;
    #[allow(clippy::cast_possible_truncation)]
    Some(float.trunc() as Millis)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
