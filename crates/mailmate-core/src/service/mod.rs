//! Mail delivery services.
//!
//! [`SmtpTransport`] talks to the mail server; [`Dispatcher`] wraps any
//! transport with the classify-and-log step that follows a successful send.

pub mod dispatcher;
pub mod smtp;

pub use dispatcher::{Classifier, Dispatcher, SendReceipt};
pub use smtp::{MailError, MailTransport, OutgoingMail, SmtpTransport};
