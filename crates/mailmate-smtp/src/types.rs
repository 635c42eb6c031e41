//! Core SMTP types: envelope addresses, replies and EHLO extensions.

use std::fmt;

use crate::error::{Error, Result};

/// Envelope address used in `MAIL FROM` and `RCPT TO`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Creates an envelope address after basic validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is empty, lacks exactly one `@`,
    /// has an empty local or domain part, or contains whitespace or angle
    /// brackets.
    pub fn new(addr: impl Into<String>) -> Result<Self> {
        let addr = addr.into();
        let trimmed = addr.trim();

        if trimmed.is_empty() {
            return Err(Error::InvalidAddress("address cannot be empty".into()));
        }
        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c == '<' || c == '>')
        {
            return Err(Error::InvalidAddress(format!(
                "address contains illegal characters: {trimmed}"
            )));
        }

        match trimmed.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(trimmed.to_string()))
            }
            _ => Err(Error::InvalidAddress(format!(
                "expected local@domain, got {trimmed}"
            ))),
        }
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// SMTP reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReplyCode(u16);

impl ReplyCode {
    /// 220 Service ready
    pub const SERVICE_READY: Self = Self(220);
    /// 221 Service closing transmission channel
    pub const CLOSING: Self = Self(221);
    /// 235 Authentication succeeded
    pub const AUTH_OK: Self = Self(235);
    /// 250 Requested mail action okay, completed
    pub const OK: Self = Self(250);
    /// 334 Continue with authentication
    pub const AUTH_CONTINUE: Self = Self(334);
    /// 354 Start mail input
    pub const START_DATA: Self = Self(354);

    /// Creates a reply code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns true for 2xx codes.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Returns true for 3xx codes.
    #[must_use]
    pub const fn is_intermediate(self) -> bool {
        self.0 >= 300 && self.0 < 400
    }
}

impl fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A complete (possibly multi-line) server reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reply code.
    pub code: ReplyCode,
    /// Text of each reply line, without the code prefix.
    pub message: Vec<String>,
}

impl Reply {
    /// Creates a new reply.
    #[must_use]
    pub const fn new(code: ReplyCode, message: Vec<String>) -> Self {
        Self { code, message }
    }

    /// Returns true if this is a 2xx reply.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code.is_success()
    }

    /// Returns the reply text as a single string.
    #[must_use]
    pub fn message_text(&self) -> String {
        self.message.join("\n")
    }

    /// Fails with [`Error::Reply`] unless the code equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns the reply as an error when the code does not match.
    pub fn expect_code(self, expected: ReplyCode) -> Result<Self> {
        if self.code == expected {
            Ok(self)
        } else {
            Err(Error::from_reply(&self))
        }
    }

    /// Fails with [`Error::Reply`] unless this is a 2xx reply.
    ///
    /// # Errors
    ///
    /// Returns the reply as an error when it is not a success.
    pub fn expect_success(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::from_reply(&self))
        }
    }
}

/// SASL mechanisms this client can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMechanism {
    /// PLAIN (RFC 4616), sent as an initial response.
    Plain,
    /// LOGIN, the legacy username/password challenge exchange.
    Login,
}

impl AuthMechanism {
    /// Returns the mechanism name as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::Login => "LOGIN",
        }
    }
}

/// Service extension advertised in the EHLO reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Extension {
    /// STARTTLS (RFC 3207).
    StartTls,
    /// AUTH with the advertised mechanism names, upper-cased.
    Auth(Vec<String>),
    /// SIZE with the optional maximum message size.
    Size(Option<usize>),
    /// 8BITMIME (RFC 6152).
    EightBitMime,
    /// SMTPUTF8 (RFC 6531).
    SmtpUtf8,
    /// Anything else, keyword upper-cased.
    Other(String),
}

impl Extension {
    /// Parses one EHLO capability line (without the reply code).
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let keyword = words.next().unwrap_or_default().to_ascii_uppercase();

        match keyword.as_str() {
            "STARTTLS" => Self::StartTls,
            "AUTH" => Self::Auth(words.map(str::to_ascii_uppercase).collect()),
            "SIZE" => Self::Size(words.next().and_then(|s| s.parse().ok())),
            "8BITMIME" => Self::EightBitMime,
            "SMTPUTF8" => Self::SmtpUtf8,
            _ => Self::Other(keyword),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_address_validation() {
        assert!(Address::new("user@example.com").is_ok());
        assert_eq!(
            Address::new("  user@example.com ").unwrap().as_str(),
            "user@example.com"
        );
        assert!(Address::new("").is_err());
        assert!(Address::new("no-at-sign").is_err());
        assert!(Address::new("@example.com").is_err());
        assert!(Address::new("user@").is_err());
        assert!(Address::new("a@b@c").is_err());
        assert!(Address::new("user name@example.com").is_err());
        assert!(Address::new("<user@example.com>").is_err());
    }

    #[test]
    fn test_extension_parse() {
        assert_eq!(Extension::parse("STARTTLS"), Extension::StartTls);
        assert_eq!(
            Extension::parse("AUTH LOGIN plain XOAUTH2"),
            Extension::Auth(vec!["LOGIN".into(), "PLAIN".into(), "XOAUTH2".into()])
        );
        assert_eq!(
            Extension::parse("SIZE 35882577"),
            Extension::Size(Some(35_882_577))
        );
        assert_eq!(Extension::parse("SIZE"), Extension::Size(None));
        assert_eq!(Extension::parse("8BITMIME"), Extension::EightBitMime);
        assert_eq!(
            Extension::parse("pipelining"),
            Extension::Other("PIPELINING".into())
        );
    }

    #[test]
    fn test_reply_expectations() {
        let ok = Reply::new(ReplyCode::OK, vec!["OK".into()]);
        assert!(ok.clone().expect_success().is_ok());
        assert!(ok.expect_code(ReplyCode::START_DATA).is_err());

        let denied = Reply::new(ReplyCode::new(535), vec!["5.7.8 Bad credentials".into()]);
        let err = denied.expect_success().unwrap_err();
        assert!(err.is_auth_failure());
        assert_eq!(err.to_string(), "SMTP error 535: 5.7.8 Bad credentials");
    }
}
