//! Error types for the core library.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::assistant::ProviderError;
use crate::service::MailError;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing a persisted file failed.
    #[error("Storage error at {}: {source}", path.display())]
    Storage {
        /// File that could not be accessed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// Stored credentials could not be authenticated or decrypted.
    #[error("Cannot decrypt stored credentials: {0}")]
    Decryption(&'static str),

    /// The send log does not have the expected schema.
    #[error("Malformed log at line {line}: {reason}")]
    MalformedLog {
        /// 1-based line number of the offending row.
        line: u64,
        /// What was wrong with it.
        reason: String,
    },

    /// Completion or search provider failed.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Mail transport failed; shown to the user as-is.
    #[error(transparent)]
    Mail(#[from] MailError),

    /// A structured store holds invalid JSON.
    #[error("Corrupt data in {}: {source}", path.display())]
    Serialization {
        /// File with the invalid content.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// Key generation or encryption failed.
    #[error("Cryptographic failure: {0}")]
    Crypto(&'static str),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wraps an I/O error with the path it concerns.
    pub(crate) fn storage(path: &Path, source: io::Error) -> Self {
        Self::Storage {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Wraps a JSON error with the path it concerns.
    pub(crate) fn serialization(path: &Path, source: serde_json::Error) -> Self {
        Self::Serialization {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
