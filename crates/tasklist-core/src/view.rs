//! Derivation of the visible task subset from a collection and a view state.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::TaskRecord;
use crate::text_matcher::TextMatcher;

/// Completion filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// Every record.
    #[default]
    All,
    /// Records not yet completed.
    Active,
    /// Completed records only.
    Completed,
}

/// Ordering applied to the visible records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most recently touched first.
    #[default]
    Recent,
    /// Least recently touched first.
    Oldest,
    /// Earliest due date first, undated last.
    Due,
}

/// Unknown option name for [`Filter`] or [`SortOrder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct UnknownOption {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl Filter {
    /// Every accepted option, in display order.
    pub const ALL: [Self; 3] = [Self::All, Self::Active, Self::Completed];

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// Whether a record passes this filter.
    #[must_use]
    pub const fn admits(self, record: &TaskRecord) -> bool {
        match self {
            Self::All => true,
            Self::Active => !record.completed,
            Self::Completed => record.completed,
        }
    }
}

impl SortOrder {
    /// Every accepted option, in display order.
    pub const ALL: [Self; 3] = [Self::Recent, Self::Oldest, Self::Due];

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Oldest => "oldest",
            Self::Due => "due",
        }
    }

    fn compare(self, a: &TaskRecord, b: &TaskRecord) -> Ordering {
        match self {
            Self::Recent => b
                .activity_millis()
                .cmp(&a.activity_millis())
                .then_with(|| b.id.cmp(&a.id)),
            Self::Oldest => a
                .activity_millis()
                .cmp(&b.activity_millis())
                .then_with(|| a.id.cmp(&b.id)),
            Self::Due => match (a.due(), b.due()) {
                (Some(a_due), Some(b_due)) => a_due.cmp(&b_due),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
            .then_with(|| a.id.cmp(&b.id)),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|option| option.as_str() == token)
            .ok_or_else(|| UnknownOption {
                kind: "filter",
                value: s.to_owned(),
                expected: "all, active, completed",
            })
    }
}

impl FromStr for SortOrder {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|option| option.as_str() == token)
            .ok_or_else(|| UnknownOption {
                kind: "sort",
                value: s.to_owned(),
                expected: "recent, oldest, due",
            })
    }
}

/// Active search, filter, and sort selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    /// Free-text label search; blank matches everything.
    pub query: String,
    /// Completion filter.
    pub filter: Filter,
    /// Ordering.
    pub sort: SortOrder,
}

impl ViewState {
    /// Apply this view to `records`. See [`project`].
    #[must_use]
    pub fn apply(&self, records: &[TaskRecord]) -> Vec<TaskRecord> {
        project(records, self)
    }
}

/// Map a collection and a view state to the ordered visible subset.
///
/// The input slice is never reordered; sorting happens on a copy.
#[must_use]
pub fn project(records: &[TaskRecord], view: &ViewState) -> Vec<TaskRecord> {
    let matcher = TextMatcher::new(&view.query);
    let mut visible: Vec<TaskRecord> = records
        .iter()
        .filter(|record| matcher.as_ref().is_none_or(|m| m.matches(record)))
        .filter(|record| view.filter.admits(record))
        .cloned()
        .collect();
    visible.sort_by(|a, b| view.sort.compare(a, b));
    visible
}
