//! Domain types, label rules, and view derivation for tasklist.

pub mod codec;
/// Task identifiers.
pub mod id;
/// Task records and timestamps.
pub mod record;
/// Case-insensitive label search.
pub mod text_matcher;
pub mod validate;
pub mod view;

pub use codec::{ImportError, sanitize_entries, sanitize_items};
pub use id::TaskId;
pub use record::{Clock, Millis, SystemClock, TaskRecord, parse_due_date};
pub use validate::{ValidationError, normalize_due_date, validate_label, validate_label_excluding};
pub use view::{Filter, SortOrder, UnknownOption, ViewState, project};
