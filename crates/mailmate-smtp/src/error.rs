//! Error types for SMTP operations.

use std::io;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TLS error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Server returned an error reply.
    #[error("SMTP error {code}: {message}")]
    Reply {
        /// Reply code (e.g., 535).
        code: u16,
        /// Reply text from the server, lines joined with newlines.
        message: String,
    },

    /// The server sent something that is not a valid SMTP reply.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid envelope address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// The server closed the connection mid-session.
    #[error("Connection closed by server")]
    ConnectionClosed,

    /// Message exceeds the size advertised by the server.
    #[error("Message of {size} bytes exceeds server limit of {limit} bytes")]
    MessageTooLarge {
        /// Size of the rejected message.
        size: usize,
        /// Limit from the SIZE extension.
        limit: usize,
    },

    /// Feature not offered by the server.
    #[error("Server does not support {0}")]
    NotSupported(String),
}

impl Error {
    /// Creates an error from a failed reply.
    #[must_use]
    pub fn from_reply(reply: &crate::types::Reply) -> Self {
        Self::Reply {
            code: reply.code.as_u16(),
            message: reply.message_text(),
        }
    }

    /// Returns true if the server refused the credentials.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Reply { code: 530 | 534 | 535, .. })
    }
}
