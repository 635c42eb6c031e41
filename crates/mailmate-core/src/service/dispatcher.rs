//! Delivery followed by classification and logging.

use std::future::Future;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, Timelike};
use tracing::{info, warn};

use super::smtp::{MailTransport, OutgoingMail};
use crate::assistant::{Assistant, CompletionProvider, FALLBACK_CATEGORY, SearchProvider};
use crate::credentials::Credentials;
use crate::error::Result;
use crate::send_log::{LogEntry, SendLog};

/// Assigns a category label to a sent message.
pub trait Classifier: Send + Sync {
    /// Returns the category for a message.
    fn category(&self, subject: &str, body: &str) -> impl Future<Output = Result<String>> + Send;
}

impl<C: CompletionProvider, S: SearchProvider> Classifier for Assistant<C, S> {
    async fn category(&self, subject: &str, body: &str) -> Result<String> {
        self.classify(subject, body).await
    }
}

/// Outcome of a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// When the message was accepted, as written to the log.
    pub timestamp: NaiveDateTime,
    /// Category assigned to the message.
    pub category: String,
}

/// Sends mail and records each delivery in the [`SendLog`].
///
/// A log entry is written if and only if the transport reports success.
#[derive(Debug)]
pub struct Dispatcher<T, K> {
    transport: T,
    classifier: K,
    log: SendLog,
}

impl<T: MailTransport, K: Classifier> Dispatcher<T, K> {
    /// Creates a dispatcher.
    pub const fn new(transport: T, classifier: K, log: SendLog) -> Self {
        Self {
            transport,
            classifier,
            log,
        }
    }

    /// The log deliveries are recorded in.
    #[must_use]
    pub const fn log(&self) -> &SendLog {
        &self.log
    }

    /// Waits `delay`, sends `mail`, then classifies and logs it.
    ///
    /// Dropping the returned future during the delay cancels the send.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Mail`](crate::Error::Mail) if delivery fails, in
    /// which case nothing is logged, or a storage error if the log cannot
    /// be written after a successful send.
    pub async fn dispatch(
        &self,
        credentials: &Credentials,
        mail: &OutgoingMail,
        delay: Duration,
    ) -> Result<SendReceipt> {
        if !delay.is_zero() {
            info!("Sending in {}s", delay.as_secs());
            tokio::time::sleep(delay).await;
        }

        self.transport.send(credentials, mail).await?;
        let timestamp = now();

        let category = match self.classifier.category(&mail.subject, &mail.body).await {
            Ok(category) if !category.is_empty() => category,
            Ok(_) => FALLBACK_CATEGORY.to_string(),
            Err(e) => {
                warn!("Classification failed, using {FALLBACK_CATEGORY}: {e}");
                FALLBACK_CATEGORY.to_string()
            }
        };

        let entry = LogEntry::new(
            timestamp,
            mail.sender.as_str(),
            mail.receiver.as_str(),
            mail.subject.as_str(),
            &mail.body,
            category.as_str(),
        );
        self.log.append(&entry)?;

        info!("Sent \"{}\" to {} ({category})", mail.subject, mail.receiver);
        Ok(SendReceipt {
            timestamp,
            category,
        })
    }
}

/// Local time truncated to whole seconds, matching the log format.
fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}
