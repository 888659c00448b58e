use crate::record::TaskRecord;

/// Case-insensitive substring matcher for task labels.
pub struct TextMatcher {
    needle: String,
}

impl TextMatcher {
    /// Normalize a query string into a matcher. Returns `None` for blank inputs.
    pub fn new(query: &str) -> Option<Self> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            needle: trimmed.to_lowercase(),
        })
    }

    /// Determine whether the record's label contains the query.
    pub fn matches(&self, record: &TaskRecord) -> bool {
        record.label.to_lowercase().contains(&self.needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::TaskId;

    fn record(label: &str) -> TaskRecord {
        TaskRecord::new(TaskId(1), label.into(), None, 0)
    }

    #[test]
    fn matcher_skips_blank_queries() {
        assert!(TextMatcher::new("").is_none());
        assert!(TextMatcher::new("   ").is_none());
        assert!(TextMatcher::new("\n").is_none());
    }

    #[test]
    fn matcher_respects_case_insensitive_search() {
        let snapshot = record("Improve CLI");

        let matcher =
            TextMatcher::new("cli").unwrap_or_else(|| panic!("matcher must exist for queries with content"));
        assert!(matcher.matches(&snapshot));

        let matcher =
            TextMatcher::new("PROVE c").unwrap_or_else(|| panic!("matcher must exist for queries with content"));
        assert!(matcher.matches(&snapshot));

        let missing =
            TextMatcher::new("api").unwrap_or_else(|| panic!("matcher must exist for queries with content"));
        assert!(!missing.matches(&snapshot));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let matcher = TextMatcher::new("  report ")
            .unwrap_or_else(|| panic!("matcher must exist for queries with content"));
        assert!(matcher.matches(&record("Write report")));
        assert!(matcher.matches(&record("reports.md")));

        let inner = TextMatcher::new("write report")
            .unwrap_or_else(|| panic!("matcher must exist for queries with content"));
        assert!(!inner.matches(&record("Write  report")));
    }
}
