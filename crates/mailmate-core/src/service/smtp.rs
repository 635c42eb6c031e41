//! SMTP delivery of outgoing mail.

use std::future::Future;

use mailmate_mime::{Attachment, MessageBuilder, plain_to_html};
use mailmate_smtp::connection::{connect, connect_tls};
use mailmate_smtp::{Address, Client, Connected};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use crate::config::{Security, SmtpConfig};
use crate::credentials::Credentials;

const CLIENT_HOSTNAME: &str = "localhost";

/// Mail transport failure.
///
/// The text of the underlying error is kept unmodified so it can be shown
/// to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailError {
    /// Could not reach the server or the connection broke.
    #[error("{0}")]
    Connection(String),

    /// The server rejected the credentials.
    #[error("{0}")]
    Authentication(String),

    /// The server refused the message or a recipient.
    #[error("{0}")]
    Rejected(String),

    /// Sender or recipient address is malformed.
    #[error("{0}")]
    InvalidAddress(String),

    /// The message could not be composed.
    #[error("{0}")]
    Compose(String),
}

impl From<mailmate_smtp::Error> for MailError {
    fn from(err: mailmate_smtp::Error) -> Self {
        use mailmate_smtp::Error as E;

        let text = err.to_string();
        if err.is_auth_failure() {
            return Self::Authentication(text);
        }
        match err {
            E::Io(_) | E::Tls(_) | E::ConnectionClosed => Self::Connection(text),
            E::InvalidAddress(_) => Self::InvalidAddress(text),
            _ => Self::Rejected(text),
        }
    }
}

impl From<mailmate_mime::Error> for MailError {
    fn from(err: mailmate_mime::Error) -> Self {
        Self::Compose(err.to_string())
    }
}

/// A message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    /// Sender address.
    pub sender: String,
    /// Recipient address.
    pub receiver: String,
    /// Subject line.
    pub subject: String,
    /// Plain text body; sent as HTML with line breaks preserved.
    pub body: String,
    /// Optional file attachment.
    pub attachment: Option<Attachment>,
}

impl OutgoingMail {
    /// Creates a message without an attachment.
    #[must_use]
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            subject: subject.into(),
            body: body.into(),
            attachment: None,
        }
    }

    /// Attaches a file.
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Body as sent on the wire.
    #[must_use]
    pub fn html_body(&self) -> String {
        plain_to_html(&self.body)
    }

    /// Composes the MIME message.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Compose`] if a header value is invalid.
    pub fn to_message(&self) -> Result<mailmate_mime::Message, MailError> {
        let mut builder = MessageBuilder::new()
            .from(&self.sender)
            .to(&self.receiver)
            .subject(&self.subject)
            .html_body(self.html_body());
        if let Some(attachment) = &self.attachment {
            builder = builder.attach(attachment.clone());
        }
        Ok(builder.build()?)
    }
}

/// Something that can deliver an [`OutgoingMail`].
pub trait MailTransport: Send + Sync {
    /// Delivers `mail`, authenticating with `credentials`.
    fn send(
        &self,
        credentials: &Credentials,
        mail: &OutgoingMail,
    ) -> impl Future<Output = Result<(), MailError>> + Send;
}

/// Delivers mail through an SMTP submission server.
#[derive(Debug, Clone)]
pub struct SmtpTransport {
    config: SmtpConfig,
}

impl SmtpTransport {
    /// Creates a transport for the configured server.
    #[must_use]
    pub const fn new(config: SmtpConfig) -> Self {
        Self { config }
    }
}

impl MailTransport for SmtpTransport {
    async fn send(&self, credentials: &Credentials, mail: &OutgoingMail) -> Result<(), MailError> {
        let from = Address::new(&mail.sender)?;
        let to = Address::new(&mail.receiver)?;
        let message = mail.to_message()?.to_bytes();

        let host = self.config.host.as_str();
        let port = self.config.port;
        debug!("Connecting to {host}:{port} ({:?})", self.config.security);

        match self.config.security {
            Security::Tls => {
                let client = Client::greet(connect_tls(host, port).await?)
                    .await?
                    .ehlo(CLIENT_HOSTNAME)
                    .await?;
                deliver(client, credentials, &from, &to, &message).await?;
            }
            Security::StartTls => {
                let client = Client::greet(connect(host, port).await?)
                    .await?
                    .ehlo(CLIENT_HOSTNAME)
                    .await?
                    .starttls(host, CLIENT_HOSTNAME)
                    .await?;
                deliver(client, credentials, &from, &to, &message).await?;
            }
            Security::None => {
                let client = Client::greet(connect(host, port).await?)
                    .await?
                    .ehlo(CLIENT_HOSTNAME)
                    .await?;
                deliver(client, credentials, &from, &to, &message).await?;
            }
        }

        info!("Delivered message to {}", mail.receiver);
        Ok(())
    }
}

/// Authenticates, sends one message and closes the session.
async fn deliver<S: AsyncRead + AsyncWrite + Unpin + Send>(
    client: Client<S, Connected>,
    credentials: &Credentials,
    from: &Address,
    to: &Address,
    message: &[u8],
) -> mailmate_smtp::Result<()> {
    let mut client = client
        .authenticate(credentials.identity(), credentials.secret())
        .await?;
    client.send_mail(from, std::slice::from_ref(to), message).await?;
    client.quit().await
}
