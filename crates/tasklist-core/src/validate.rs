//! Label and due date rules applied before any mutation.

use thiserror::Error;

use crate::id::TaskId;
use crate::record::TaskRecord;

/// Minimum label length (trimmed, in characters).
pub const MIN_LABEL_CHARS: usize = 3;
/// Maximum label length (trimmed, in characters).
pub const MAX_LABEL_CHARS: usize = 100;

/// Rejection reasons for a candidate label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Nothing left after trimming.
    #[error("Label must not be blank")]
    Blank,
    /// Fewer than [`MIN_LABEL_CHARS`] characters.
    #[error("Label must be at least 3 characters")]
    TooShort,
    /// More than [`MAX_LABEL_CHARS`] characters.
    #[error("Label must be under 100 characters")]
    TooLong,
    /// Case-insensitive clash with an existing label.
    #[error("A task with this name already exists")]
    Duplicate,
}

/// Check `candidate` against the label rules and the labels already in use.
///
/// Rules run in order and the first failure wins. Returns the trimmed label.
///
/// # Errors
/// Returns the first [`ValidationError`] the candidate violates.
pub fn validate_label<'a, I>(candidate: &str, existing: I) -> Result<String, ValidationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank);
    }
    let chars = trimmed.chars().count();
    if chars < MIN_LABEL_CHARS {
        return Err(ValidationError::TooShort);
    }
    if chars > MAX_LABEL_CHARS {
        return Err(ValidationError::TooLong);
    }
    let folded = trimmed.to_lowercase();
    if existing
        .into_iter()
        .any(|label| label.trim().to_lowercase() == folded)
    {
        return Err(ValidationError::Duplicate);
    }
    Ok(trimmed.to_owned())
}

/// Same as [`validate_label`] but ignores the record identified by `skip`.
///
/// # Errors
/// Returns the first [`ValidationError`] the candidate violates.
pub fn validate_label_excluding(
    candidate: &str,
    records: &[TaskRecord],
    skip: TaskId,
) -> Result<String, ValidationError> {
    validate_label(
        candidate,
        records
            .iter()
            .filter(|record| record.id != skip)
            .map(|record| record.label.as_str()),
    )
}

/// Trim a due date and drop it when blank.
#[must_use]
pub fn normalize_due_date(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [&str; 0] = [];

    #[test]
    fn accepts_and_trims_valid_label() {
        assert_eq!(validate_label("  Write report ", NONE), Ok("Write report".to_owned()));
    }

    #[test]
    fn rules_apply_in_order() {
        assert_eq!(validate_label("   ", NONE), Err(ValidationError::Blank));
        assert_eq!(validate_label(" ab ", NONE), Err(ValidationError::TooShort));
        assert_eq!(validate_label(&"x".repeat(101), NONE), Err(ValidationError::TooLong));
        // too short beats duplicate
        assert_eq!(validate_label("ab", ["AB"]), Err(ValidationError::TooShort));
    }

    #[test]
    fn length_bounds_are_inclusive() {
        assert!(validate_label("abc", NONE).is_ok());
        assert!(validate_label(&"y".repeat(100), NONE).is_ok());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert!(validate_label("日本語", NONE).is_ok());
    }

    #[test]
    fn duplicate_check_ignores_case_and_whitespace() {
        let existing = ["Write report"];
        assert_eq!(
            validate_label("write report  ", existing),
            Err(ValidationError::Duplicate)
        );
        assert_eq!(
            ValidationError::Duplicate.to_string(),
            "A task with this name already exists"
        );
    }

    #[test]
    fn excluding_skips_the_record_itself() {
        let records = vec![
            TaskRecord::new(TaskId(1), "Write report".into(), None, 0),
            TaskRecord::new(TaskId(2), "Buy milk".into(), None, 0),
        ];
        assert_eq!(
            validate_label_excluding("WRITE REPORT", &records, TaskId(1)),
            Ok("WRITE REPORT".to_owned())
        );
        assert_eq!(
            validate_label_excluding("buy milk", &records, TaskId(1)),
            Err(ValidationError::Duplicate)
        );
    }

    #[test]
    fn due_date_blank_becomes_none() {
        assert_eq!(normalize_due_date(None), None);
        assert_eq!(normalize_due_date(Some("  ")), None);
        assert_eq!(normalize_due_date(Some(" 2030-01-01 ")), Some("2030-01-01".to_owned()));
    }
}
