//! CSV-file send log.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::debug;

use super::model::{HEADER, LogEntry, TIMESTAMP_FORMAT, body_preview};
use crate::error::{Error, Result};
use crate::storage;

/// Append-only log of delivered mail.
#[derive(Debug, Clone)]
pub struct SendLog {
    path: PathBuf,
}

impl SendLog {
    /// Creates a log backed by the CSV file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry, writing the header first if the log is empty.
    ///
    /// The preview is cut to [`PREVIEW_CHARS`](super::PREVIEW_CHARS) again
    /// on the way out, so entries built by hand obey the same limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn append(&self, entry: &LogEntry) -> Result<()> {
        let timestamp = entry.timestamp_text();
        let preview = body_preview(&entry.body_preview);
        storage::append_record(
            &self.path,
            &HEADER,
            &[
                timestamp.as_str(),
                entry.sender.as_str(),
                entry.receiver.as_str(),
                entry.subject.as_str(),
                preview.as_str(),
                entry.category.as_str(),
            ],
        )?;
        debug!("Logged send to {} at {timestamp}", entry.receiver);
        Ok(())
    }

    /// Returns entries in file order, optionally filtered by `keyword`.
    ///
    /// An empty keyword is the same as none. See [`LogEntry::matches`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedLog`] if any row does not fit the schema.
    pub fn query(&self, keyword: Option<&str>) -> Result<Vec<LogEntry>> {
        let entries = storage::read_records(&self.path, &HEADER)?
            .into_iter()
            .map(|(line, record)| parse_entry(line, &record))
            .collect::<Result<Vec<_>>>()?;

        Ok(match keyword.filter(|k| !k.is_empty()) {
            Some(keyword) => entries.into_iter().filter(|e| e.matches(keyword)).collect(),
            None => entries,
        })
    }

    /// Number of sends per calendar day, ascending by date.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read.
    pub fn daily_counts(&self) -> Result<Vec<(NaiveDate, usize)>> {
        Ok(daily_counts(&self.query(None)?))
    }

    /// Number of sends per category.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read.
    pub fn category_counts(&self) -> Result<BTreeMap<String, usize>> {
        Ok(category_counts(&self.query(None)?))
    }
}

fn parse_entry(line: u64, record: &StringRecord) -> Result<LogEntry> {
    let field = |i: usize| record.get(i).unwrap_or_default().to_string();

    let timestamp = NaiveDateTime::parse_from_str(&field(0), TIMESTAMP_FORMAT).map_err(|e| {
        Error::MalformedLog {
            line,
            reason: format!("invalid timestamp: {e}"),
        }
    })?;

    Ok(LogEntry {
        timestamp,
        sender: field(1),
        receiver: field(2),
        subject: field(3),
        body_preview: field(4),
        category: field(5),
    })
}

/// Groups entries by calendar date, ascending.
#[must_use]
pub fn daily_counts(entries: &[LogEntry]) -> Vec<(NaiveDate, usize)> {
    let mut counts = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.timestamp.date()).or_insert(0) += 1;
    }
    counts.into_iter().collect()
}

/// Frequency of each category label.
#[must_use]
pub fn category_counts(entries: &[LogEntry]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.category.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn at(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).unwrap()
    }

    fn entry(ts: &str, receiver: &str, subject: &str, category: &str) -> LogEntry {
        LogEntry::new(at(ts), "me@example.com", receiver, subject, "hello", category)
    }

    fn log() -> (tempfile::TempDir, SendLog) {
        let dir = tempfile::tempdir().unwrap();
        let log = SendLog::new(dir.path().join("sent_log.csv"));
        (dir, log)
    }

    #[test]
    fn test_missing_log_is_empty() {
        let (_dir, log) = log();
        assert!(log.query(None).unwrap().is_empty());
        assert!(log.daily_counts().unwrap().is_empty());
        assert!(log.category_counts().unwrap().is_empty());
        assert!(!log.path().exists());
    }

    #[test]
    fn test_append_preserves_order() {
        let (_dir, log) = log();
        let entries = [
            entry("2025-01-01 09:00:00", "a@example.com", "First", "Work"),
            entry("2025-01-01 10:00:00", "b@example.com", "Second", "School"),
            entry("2025-01-02 08:30:00", "c@example.com", "Third", "Work"),
        ];
        for e in &entries {
            log.append(e).unwrap();
        }

        assert_eq!(log.query(None).unwrap(), entries);
        assert_eq!(log.query(Some("")).unwrap().len(), 3);

        let text = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            text.lines().next(),
            Some("timestamp,sender,receiver,subject,body_preview,category")
        );
        assert_eq!(text.matches("timestamp,sender").count(), 1);
    }

    #[test]
    fn test_keyword_filter() {
        let (_dir, log) = log();
        log.append(&entry("2025-01-01 09:00:00", "boss@corp.example", "Leave request", "Work"))
            .unwrap();
        log.append(&entry("2025-01-01 10:00:00", "mom@home.example", "Dinner", "Personal"))
            .unwrap();

        let hits = log.query(Some("corp")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].subject, "Leave request");

        assert_eq!(log.query(Some("Dinner")).unwrap().len(), 1);
        assert!(log.query(Some("dinner")).unwrap().is_empty());
    }

    #[test]
    fn test_fields_with_commas_and_newlines() {
        let (_dir, log) = log();
        let e = LogEntry::new(
            at("2025-03-04 05:06:07"),
            "me@example.com",
            "you@example.com",
            "Hi, \"friend\"",
            "line one\nline two",
            "Personal",
        );
        log.append(&e).unwrap();

        let read = log.query(None).unwrap();
        assert_eq!(read, vec![e]);
        assert_eq!(read[0].body_preview, "line one\nline two");
    }

    #[test]
    fn test_counts() {
        let (_dir, log) = log();
        log.append(&entry("2025-01-02 09:00:00", "a@example.com", "x", "Work")).unwrap();
        log.append(&entry("2025-01-01 09:00:00", "a@example.com", "y", "Work")).unwrap();
        log.append(&entry("2025-01-01 23:59:59", "a@example.com", "z", "Other")).unwrap();

        let daily = log.daily_counts().unwrap();
        assert_eq!(
            daily,
            vec![
                (NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 2),
                (NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(), 1),
            ]
        );

        let categories = log.category_counts().unwrap();
        assert_eq!(categories.get("Work"), Some(&2));
        assert_eq!(categories.get("Other"), Some(&1));
        assert_eq!(categories.len(), 2);
    }

    #[test]
    fn test_daily_counts_sum_to_total() {
        let entries: Vec<_> = ["2025-02-03", "2025-02-01", "2025-02-03", "2025-02-02", "2025-02-01"]
            .iter()
            .map(|day| entry(&format!("{day} 12:00:00"), "a@example.com", "s", "Work"))
            .collect();

        let daily = daily_counts(&entries);
        assert_eq!(daily.len(), 3);
        assert!(daily.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(daily.iter().map(|(_, n)| n).sum::<usize>(), entries.len());
    }

    #[test]
    fn test_hand_built_preview_is_truncated() {
        let (_dir, log) = log();
        let mut e = entry("2025-01-01 09:00:00", "a@example.com", "x", "Work");
        e.body_preview = "b".repeat(250);
        log.append(&e).unwrap();

        let stored = log.query(None).unwrap();
        assert_eq!(stored[0].body_preview, format!("{}...", "b".repeat(100)));

        // Already truncated previews are written unchanged.
        let cut = LogEntry::new(at("2025-01-01 10:00:00"), "a", "b", "y", &"c".repeat(150), "Work");
        log.append(&cut).unwrap();
        assert_eq!(log.query(None).unwrap()[1], cut);
    }

    #[test]
    fn test_bad_timestamp_is_malformed() {
        let (_dir, log) = log();
        std::fs::write(
            log.path(),
            "timestamp,sender,receiver,subject,body_preview,category\n\
             yesterday,a,b,c,d,Work\n",
        )
        .unwrap();

        let err = log.query(None).unwrap_err();
        assert!(matches!(err, Error::MalformedLog { line: 2, .. }));
    }

    #[test]
    fn test_short_row_is_malformed() {
        let (_dir, log) = log();
        log.append(&entry("2025-01-01 09:00:00", "a@example.com", "x", "Work")).unwrap();
        let mut text = std::fs::read_to_string(log.path()).unwrap();
        text.push_str("2025-01-01 10:00:00,a,b,c\n");
        std::fs::write(log.path(), text).unwrap();

        assert!(matches!(
            log.query(None),
            Err(Error::MalformedLog { line: 3, .. })
        ));
    }
}
