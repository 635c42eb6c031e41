//! # mailmate-mime
//!
//! Builds the RFC 5322 / MIME messages mailmate hands to SMTP.
//!
//! ## Features
//!
//! - **HTML bodies**: UTF-8, base64 transfer encoding, safe for any script
//! - **Attachments**: `multipart/mixed` with base64 parts and a guessed
//!   content type
//! - **Header encoding**: RFC 2047 encoded-words for non-ASCII subjects,
//!   display names and attachment names
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailmate_mime::{Attachment, MessageBuilder};
//!
//! let message = MessageBuilder::new()
//!     .from("me@example.com")
//!     .to("you@example.com")
//!     .subject("會議紀錄")
//!     .html_body("Hello<br>World")
//!     .attach(Attachment::new("notes.pdf", pdf_bytes))
//!     .build()?;
//!
//! let wire: Vec<u8> = message.to_bytes();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
mod header;
mod message;

pub mod encoding;

pub use error::{Error, Result};
pub use header::Headers;
pub use message::{Attachment, Message, MessageBuilder, plain_to_html};
