use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, macros::format_description};

use crate::id::TaskId;

/// Milliseconds since the Unix epoch.
pub type Millis = i64;

/// A single to-do entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    /// Identifier unique within the owning collection.
    pub id: TaskId,
    /// Trimmed display label.
    pub label: String,
    /// Completion flag.
    #[serde(default)]
    pub completed: bool,
    /// Creation timestamp, never changed after creation.
    pub created_at: Millis,
    /// Last mutation timestamp (`>= created_at`).
    pub updated_at: Millis,
    /// Optional `YYYY-MM-DD` due date.
    #[serde(default)]
    pub due_date: Option<String>,
}

impl TaskRecord {
    /// Build a fresh, incomplete record stamped at `now`.
    #[must_use]
    pub const fn new(id: TaskId, label: String, due_date: Option<String>, now: Millis) -> Self {
        Self {
            id,
            label,
            completed: false,
            created_at: now,
            updated_at: now,
            due_date,
        }
    }

    /// Refresh `updated_at`, never moving it backwards or below `created_at`.
    pub fn touch(&mut self, now: Millis) {
        self.updated_at = now.max(self.updated_at).max(self.created_at);
    }

    /// Time key used by recency ordering.
    #[must_use]
    pub const fn activity_millis(&self) -> Millis {
        self.updated_at
    }

    /// Due date parsed as a calendar date; `None` when absent or unparseable.
    #[must_use]
    pub fn due(&self) -> Option<Date> {
        self.due_date.as_deref().and_then(parse_due_date)
    }
}

/// Parse a `YYYY-MM-DD` date string.
#[must_use]
pub fn parse_due_date(raw: &str) -> Option<Date> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(raw.trim(), format).ok()
}

/// Source of wall-clock time for record stamps.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> Millis;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> Millis {
        let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        Millis::try_from(nanos).unwrap_or(Millis::MAX)
    }
}
