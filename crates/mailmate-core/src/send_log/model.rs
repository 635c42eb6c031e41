//! Send log entry model.

use chrono::NaiveDateTime;

/// Column names of the log file, in order.
pub const HEADER: [&str; 6] = [
    "timestamp",
    "sender",
    "receiver",
    "subject",
    "body_preview",
    "category",
];

/// Text format of the `timestamp` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Number of body characters kept in the preview.
pub const PREVIEW_CHARS: usize = 100;

const ELLIPSIS: &str = "...";

/// Returns the first [`PREVIEW_CHARS`] characters of `body`, followed by
/// `...` only if the body is longer than that.
#[must_use]
pub fn body_preview(body: &str) -> String {
    match body.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &body[..cut]),
        None => body.to_string(),
    }
}

/// One delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Local time the send completed, second precision.
    pub timestamp: NaiveDateTime,
    /// Sender address.
    pub sender: String,
    /// Recipient address.
    pub receiver: String,
    /// Subject line.
    pub subject: String,
    /// Truncated body, see [`body_preview`].
    pub body_preview: String,
    /// Classification label.
    pub category: String,
}

impl LogEntry {
    /// Builds an entry, deriving the preview from the full `body`.
    #[must_use]
    pub fn new(
        timestamp: NaiveDateTime,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        subject: impl Into<String>,
        body: &str,
        category: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            sender: sender.into(),
            receiver: receiver.into(),
            subject: subject.into(),
            body_preview: body_preview(body),
            category: category.into(),
        }
    }

    /// Whether `keyword` occurs in the subject or the receiver.
    ///
    /// Case-sensitive literal substring match.
    #[must_use]
    pub fn matches(&self, keyword: &str) -> bool {
        self.subject.contains(keyword) || self.receiver.contains(keyword)
    }

    /// The timestamp rendered with [`TIMESTAMP_FORMAT`].
    #[must_use]
    pub fn timestamp_text(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_preview_boundary() {
        let exact = "a".repeat(100);
        assert_eq!(body_preview(&exact), exact);

        let long = "a".repeat(101);
        assert_eq!(body_preview(&long), format!("{}...", "a".repeat(100)));
    }

    #[test]
    fn test_preview_counts_characters() {
        let body = "日".repeat(150);
        let preview = body_preview(&body);
        assert_eq!(preview.chars().count(), 103);
        assert!(preview.ends_with("日..."));
    }

    #[test]
    fn test_matches_is_case_sensitive() {
        let ts = NaiveDateTime::parse_from_str("2025-01-01 10:00:00", TIMESTAMP_FORMAT).unwrap();
        let entry = LogEntry::new(ts, "me@example.com", "boss@corp.example", "Quarterly Report", "", "Work");

        assert!(entry.matches("Report"));
        assert!(entry.matches("corp"));
        assert!(!entry.matches("report"));
        assert!(!entry.matches("me@example"));
        assert_eq!(entry.timestamp_text(), "2025-01-01 10:00:00");
    }

    proptest! {
        #[test]
        fn prop_short_bodies_are_kept(body in "\\PC{0,100}") {
            prop_assert_eq!(body_preview(&body), body);
        }

        #[test]
        fn prop_long_bodies_are_cut(body in "\\PC{101,200}") {
            let head: String = body.chars().take(PREVIEW_CHARS).collect();
            prop_assert_eq!(body_preview(&body), format!("{head}..."));
        }
    }
}
