//! Ordered header block for outgoing messages.

use std::fmt;

use crate::encoding::encode_rfc2047;
use crate::error::{Error, Result};

/// Header fields in insertion order.
///
/// Values are stored already encoded for the wire; use [`Headers::set_text`]
/// for human text that may need RFC 2047 encoding.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    fields: Vec<(String, String)>,
}

impl Headers {
    /// Creates an empty header block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a header, replacing an existing field of the same name
    /// (case-insensitive) in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the value contains a bare CR or LF, which would
    /// inject extra header lines.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        if value.contains(['\r', '\n']) && !is_folded(&value) {
            return Err(Error::InvalidHeader {
                name: name.to_string(),
                reason: "value contains a line break".to_string(),
            });
        }

        match self
            .fields
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name.to_string(), value)),
        }
        Ok(())
    }

    /// Sets a header from human-readable text, applying RFC 2047 encoding
    /// when it contains non-ASCII characters.
    ///
    /// # Errors
    ///
    /// Returns an error if the text contains a line break.
    pub fn set_text(&mut self, name: &str, text: &str) -> Result<()> {
        if text.contains(['\r', '\n']) {
            return Err(Error::InvalidHeader {
                name: name.to_string(),
                reason: "value contains a line break".to_string(),
            });
        }
        self.set(name, encode_rfc2047(text))
    }

    /// Gets a header value by name (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// True when every line break is a CRLF followed by folding whitespace.
fn is_folded(value: &str) -> bool {
    value
        .split("\r\n")
        .skip(1)
        .all(|line| line.starts_with([' ', '\t']))
        && !value.replace("\r\n", "").contains(['\r', '\n'])
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.fields {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}
