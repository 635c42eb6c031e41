//! Append-only record of delivered mail and the statistics derived from it.

mod model;
mod repository;

pub use model::{HEADER, LogEntry, PREVIEW_CHARS, TIMESTAMP_FORMAT, body_preview};
pub use repository::{SendLog, category_counts, daily_counts};
