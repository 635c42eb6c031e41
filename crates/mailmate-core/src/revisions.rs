//! Record of generated drafts that the user edited before sending.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::draft::Draft;
use crate::error::Result;
use crate::storage;

const HEADER: [&str; 3] = ["subject", "draft", "revised"];

/// A generated body next to what was actually sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    /// Final subject line.
    pub subject: String,
    /// Body as generated by the assistant.
    pub draft: String,
    /// Body after the user's edits.
    pub revised: String,
}

/// Append-only CSV log of [`Revision`]s.
#[derive(Debug, Clone)]
pub struct RevisionLog {
    path: PathBuf,
}

impl RevisionLog {
    /// Creates a log backed by the CSV file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a row if `draft` was edited. Returns whether a row was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn record(&self, draft: &Draft) -> Result<bool> {
        if !draft.is_revised() {
            return Ok(false);
        }

        storage::append_record(
            &self.path,
            &HEADER,
            &[draft.subject(), draft.generated_body(), draft.body()],
        )?;
        debug!("Recorded revision of \"{}\"", draft.subject());
        Ok(true)
    }

    /// All rows in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not fit the schema.
    pub fn query(&self) -> Result<Vec<Revision>> {
        Ok(storage::read_records(&self.path, &HEADER)?
            .into_iter()
            .map(|(_, record)| Revision {
                subject: record[0].to_string(),
                draft: record[1].to_string(),
                revised: record[2].to_string(),
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unedited_draft_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let log = RevisionLog::new(dir.path().join("revisions.csv"));

        let draft = Draft::new("Hello", "Generated body");
        assert!(!log.record(&draft).unwrap());
        assert!(!log.path().exists());
        assert!(log.query().unwrap().is_empty());
    }

    #[test]
    fn test_edited_draft_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let log = RevisionLog::new(dir.path().join("revisions.csv"));

        let mut draft = Draft::new("Hello", "Generated body");
        draft.revise_body("Edited body,\nwith two lines");
        assert!(log.record(&draft).unwrap());

        assert_eq!(
            log.query().unwrap(),
            vec![Revision {
                subject: "Hello".into(),
                draft: "Generated body".into(),
                revised: "Edited body,\nwith two lines".into(),
            }]
        );
        let text = std::fs::read_to_string(log.path()).unwrap();
        assert!(text.starts_with("subject,draft,revised\n"));
    }
}
