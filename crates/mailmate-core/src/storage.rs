//! File primitives shared by the stores.
//!
//! Whole-file stores are replaced with write-to-temp plus rename, so a
//! reader never sees a half-written file. Tabular logs are append-only
//! CSV with a header row written lazily before the first record.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::debug;

use crate::error::{Error, Result};

/// Reads a whole file, returning `None` if it does not exist.
pub(crate) fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::storage(path, e)),
    }
}

/// Creates the parent directory of `path` if needed.
pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|e| Error::storage(dir, e))
        }
        _ => Ok(()),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "store".into(), |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}

/// Replaces the file at `path` with `contents` atomically.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    ensure_parent(path)?;
    let tmp = temp_path(path);

    let result = (|| {
        let mut file = File::create(&tmp)?;
        file.write_all(contents)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(Error::storage(path, e));
    }

    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Maps a CSV error to a storage or schema failure.
fn csv_error(path: &Path, err: csv::Error) -> Error {
    let line = err.position().map_or(0, csv::Position::line);
    match err.into_kind() {
        csv::ErrorKind::Io(e) => Error::storage(path, e),
        other => Error::MalformedLog {
            line,
            reason: format!("{other:?}"),
        },
    }
}

/// Appends one record, writing `header` first if the file is new or empty.
pub(crate) fn append_record(path: &Path, header: &[&str], record: &[&str]) -> Result<()> {
    ensure_parent(path)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::storage(path, e))?;
    let needs_header = file.metadata().map_err(|e| Error::storage(path, e))?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if needs_header {
        writer
            .write_record(header)
            .map_err(|e| csv_error(path, e))?;
    }
    writer
        .write_record(record)
        .map_err(|e| csv_error(path, e))?;
    writer.flush().map_err(|e| Error::storage(path, e))?;

    Ok(())
}

/// Reads all data records with their 1-based line numbers.
///
/// A missing or empty file yields no records. The first row must equal
/// `header` and every row must have exactly `header.len()` fields.
pub(crate) fn read_records(path: &Path, header: &[&str]) -> Result<Vec<(u64, StringRecord)>> {
    let Some(bytes) = read_optional(path)? else {
        return Ok(Vec::new());
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes.as_slice());

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| csv_error(path, e))?;
        let line = record.position().map_or(index as u64 + 1, csv::Position::line);

        if record.len() != header.len() {
            return Err(Error::MalformedLog {
                line,
                reason: format!("expected {} fields, found {}", header.len(), record.len()),
            });
        }

        if index == 0 {
            if record.iter().ne(header.iter().copied()) {
                return Err(Error::MalformedLog {
                    line,
                    reason: format!(
                        "unexpected header row: {}",
                        record.iter().collect::<Vec<_>>().join(",")
                    ),
                });
            }
            continue;
        }

        records.push((line, record));
    }

    Ok(records)
}
