//! # mailmate-core
//!
//! Core business logic for the `mailmate` mail assistant.
//!
//! This crate provides:
//! - **Key Manager** - one persisted AES-256 key, created on first use
//! - **Credential Store** - the remembered sender identity and app
//!   password, encrypted at rest with authenticated encryption
//! - **Contact Directory** - name to address book, stored as JSON
//! - **Send Log** - append-only CSV record of delivered mail with daily
//!   and per-category statistics
//! - **Revision Log** - record of generated drafts the user edited
//! - **Assistant** - drafting, classification, research and planning
//!   over pluggable completion and search providers
//! - **Mail Dispatcher** - SMTP delivery followed by logging
//!
//! Every component takes its file paths or configuration through its
//! constructor; nothing here holds process-wide state.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod assistant;
pub mod config;
pub mod contacts;
pub mod credentials;
mod crypto;
pub mod draft;
mod error;
pub mod keys;
pub mod revisions;
pub mod send_log;
pub mod service;
mod storage;

pub use assistant::{
    Assistant, CompletionProvider, DuckDuckGoSearch, Language, OpenRouterClient, ProviderError,
    SearchProvider,
};
pub use config::{CompletionConfig, Config, SearchConfig, Security, SmtpConfig, StorePaths};
pub use contacts::{Contact, ContactDirectory};
pub use credentials::{CredentialStore, Credentials};
pub use draft::Draft;
pub use error::{Error, Result};
pub use keys::{KeyManager, SecretKey};
pub use revisions::{Revision, RevisionLog};
pub use send_log::{LogEntry, SendLog, body_preview, category_counts, daily_counts};
pub use service::{
    Classifier, Dispatcher, MailError, MailTransport, OutgoingMail, SendReceipt, SmtpTransport,
};
