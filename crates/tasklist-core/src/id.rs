use serde::{Deserialize, Serialize};
use std::{fmt, num::ParseIntError, str::FromStr};

/// Identifier of a task record (positive, unique within a collection).
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl TaskId {
    /// Largest identifier accepted from imported or stored data.
    ///
    /// Matches the largest integer a JSON number holds exactly, and leaves
    /// room for every later `next_after`.
    pub const MAX_STORED: Self = Self((1 << 53) - 1);

    /// Next identifier for a collection: the largest id in use plus one.
    #[must_use]
    pub fn next_after<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        ids.into_iter()
            .max()
            .map_or(Self(1), |max| Self(max.0.saturating_add(1)))
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TaskId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl From<u64> for TaskId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
