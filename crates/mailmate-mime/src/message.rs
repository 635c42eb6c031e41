//! Outgoing message structure and builder.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, FixedOffset, Local};
use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::encoding::{encode_base64_wrapped, encode_rfc2047};
use crate::error::{Error, Result};
use crate::header::Headers;

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Converts plain text to the minimal HTML mailmate sends: line breaks
/// become `<br>`, everything else is passed through.
#[must_use]
pub fn plain_to_html(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "<br>")
}

/// A file attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name shown to the recipient.
    pub filename: String,
    /// MIME type of the content.
    pub content_type: String,
    /// Raw file content.
    pub data: Vec<u8>,
}

impl Attachment {
    /// Creates an attachment, guessing the content type from the file name.
    #[must_use]
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = guess_content_type(&filename).to_string();
        Self {
            filename,
            content_type,
            data,
        }
    }

    /// Reads an attachment from disk, named after the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map_or_else(|| "attachment".to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(filename, data))
    }

    /// File name with quotes escaped and line breaks removed, encoded for
    /// use inside a quoted MIME parameter.
    fn quoted_filename(&self) -> String {
        let cleaned: String = self
            .filename
            .chars()
            .filter(|c| !c.is_control())
            .collect();
        encode_rfc2047(&cleaned)
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
    }
}

/// Maps common file extensions to MIME types.
fn guess_content_type(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "htm" | "html" => "text/html",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "zip" => "application/zip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => "application/octet-stream",
    }
}

/// A fully composed message ready for SMTP `DATA`.
#[derive(Debug, Clone)]
pub struct Message {
    headers: Headers,
    body: String,
}

impl Message {
    /// Returns the top-level headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the encoded body (everything after the blank line).
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Serializes the message with CRLF line endings.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\r\n{}", self.headers, self.body)
    }
}

/// Builder for outgoing HTML messages with optional attachments.
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    from: Option<String>,
    to: Vec<String>,
    subject: String,
    html_body: String,
    attachments: Vec<Attachment>,
    date: Option<DateTime<FixedOffset>>,
    boundary: Option<String>,
}

impl MessageBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sender address.
    #[must_use]
    pub fn from(mut self, address: impl Into<String>) -> Self {
        self.from = Some(address.into());
        self
    }

    /// Adds a recipient address.
    #[must_use]
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }

    /// Sets the subject (any script; encoded as needed).
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the HTML body.
    #[must_use]
    pub fn html_body(mut self, html: impl Into<String>) -> Self {
        self.html_body = html.into();
        self
    }

    /// Adds an attachment; the message becomes `multipart/mixed`.
    #[must_use]
    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Fixes the `Date` header instead of using the current local time.
    #[must_use]
    pub fn date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.date = Some(date);
        self
    }

    /// Fixes the multipart boundary instead of generating a random one.
    #[must_use]
    pub fn boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = Some(boundary.into());
        self
    }

    /// Composes the message.
    ///
    /// # Errors
    ///
    /// Returns an error if the sender or recipients are missing, or a header
    /// value contains a line break.
    pub fn build(self) -> Result<Message> {
        let from = self.from.ok_or(Error::MissingHeader("From"))?;
        if self.to.is_empty() {
            return Err(Error::MissingHeader("To"));
        }

        let date = self
            .date
            .unwrap_or_else(|| Local::now().fixed_offset())
            .to_rfc2822();
        let domain = from
            .rsplit_once('@')
            .map_or("localhost", |(_, domain)| domain);

        let mut headers = Headers::new();
        headers.set("From", from.as_str())?;
        headers.set("To", self.to.join(", "))?;
        headers.set_text("Subject", &self.subject)?;
        headers.set("Date", date)?;
        headers.set("Message-ID", format!("<{}@{domain}>", random_token(24)))?;
        headers.set("MIME-Version", "1.0")?;

        let html = encode_base64_wrapped(self.html_body.as_bytes());

        if self.attachments.is_empty() {
            headers.set("Content-Type", HTML_CONTENT_TYPE)?;
            headers.set("Content-Transfer-Encoding", "base64")?;
            return Ok(Message {
                headers,
                body: html,
            });
        }

        let boundary = self
            .boundary
            .unwrap_or_else(|| format!("=_mailmate_{}", random_token(24)));
        headers.set(
            "Content-Type",
            format!("multipart/mixed; boundary=\"{boundary}\""),
        )?;

        let mut body = String::new();
        body.push_str("This is a multi-part message in MIME format.\r\n");

        body.push_str(&format!("--{boundary}\r\n"));
        body.push_str(&format!("Content-Type: {HTML_CONTENT_TYPE}\r\n"));
        body.push_str("Content-Transfer-Encoding: base64\r\n\r\n");
        body.push_str(&html);

        for attachment in &self.attachments {
            let name = attachment.quoted_filename();
            body.push_str(&format!("--{boundary}\r\n"));
            body.push_str(&format!(
                "Content-Type: {}; name=\"{name}\"\r\n",
                attachment.content_type
            ));
            body.push_str("Content-Transfer-Encoding: base64\r\n");
            body.push_str(&format!(
                "Content-Disposition: attachment; filename=\"{name}\"\r\n\r\n"
            ));
            body.push_str(&encode_base64_wrapped(&attachment.data));
        }

        body.push_str(&format!("--{boundary}--\r\n"));

        Ok(Message { headers, body })
    }
}

fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
