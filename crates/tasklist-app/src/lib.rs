//! Application layer logic for tasklist.
//!
//! This crate owns the canonical task collection, view preferences, and the
//! configuration that wires storage tiers together for the CLI.

pub mod config;
pub mod preferences;
pub mod task_store;

// Re-exports for convenience
pub use config::{LocalTierConfig, ProjectConfig, RemoteTierConfig, StorageConfig};
pub use preferences::{PREFERENCES_KEY, ViewSession};
pub use task_store::{TaskCounts, TaskError, TaskResult, TaskStore};
