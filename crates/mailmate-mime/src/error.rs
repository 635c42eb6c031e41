//! Error types for MIME composition.

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required header was never set on the builder.
    #[error("Missing required header: {0}")]
    MissingHeader(&'static str),

    /// A header value would break the message framing.
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader {
        /// Header name.
        name: String,
        /// Why the value was refused.
        reason: String,
    },

    /// Reading an attachment from disk failed.
    #[error("Attachment error: {0}")]
    Attachment(#[from] std::io::Error),
}
