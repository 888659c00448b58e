//! Storage tiers and snapshot persistence for tasklist.

pub mod backend;
pub mod error;
mod file;
pub mod layer;
pub mod tier;

pub use backend::{DisabledStore, KeyValueStore, LatentStore, MemoryStore};
pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use layer::{PendingSave, PersistenceLayer, TASKS_KEY};
pub use tier::{Tier, TierKind, TierStatus};
