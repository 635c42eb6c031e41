//! Transfer and header encodings.
//!
//! Supports Base64 body encoding (RFC 2045) and RFC 2047 encoded-words.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Maximum length of an encoded body line, excluding CRLF.
const MAX_LINE_LENGTH: usize = 76;

/// Maximum length of one encoded-word (RFC 2047 section 2).
const MAX_ENCODED_WORD: usize = 75;

/// Encodes data as Base64 without line breaks.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes data as Base64 wrapped at 76 columns with CRLF line breaks.
///
/// The output ends with a CRLF unless `data` is empty.
#[must_use]
pub fn encode_base64_wrapped(data: &[u8]) -> String {
    let encoded = encode_base64(data);
    let mut result = String::with_capacity(encoded.len() + encoded.len() / MAX_LINE_LENGTH * 2 + 2);

    // Base64 output is ASCII, so byte chunks are valid str boundaries.
    for chunk in encoded.as_bytes().chunks(MAX_LINE_LENGTH) {
        result.push_str(&String::from_utf8_lossy(chunk));
        result.push_str("\r\n");
    }

    result
}

/// Returns true if `text` cannot go into a header verbatim.
#[must_use]
pub fn needs_encoding(text: &str) -> bool {
    !text
        .chars()
        .all(|c| c.is_ascii() && !c.is_ascii_control() && c != '=' && c != '?')
}

/// Encodes a header value using RFC 2047 `B` encoded-words.
///
/// ASCII-only text is returned unchanged. Longer text is split across
/// several encoded-words separated by folding whitespace, never splitting a
/// UTF-8 sequence.
#[must_use]
pub fn encode_rfc2047(text: &str) -> String {
    const PREFIX: &str = "=?utf-8?B?";
    const SUFFIX: &str = "?=";

    if !needs_encoding(text) {
        return text.to_string();
    }

    // Each 3 input bytes become 4 output characters.
    let max_raw = (MAX_ENCODED_WORD - PREFIX.len() - SUFFIX.len()) / 4 * 3;

    let mut words = Vec::new();
    let mut chunk = String::new();
    for ch in text.chars() {
        if chunk.len() + ch.len_utf8() > max_raw {
            words.push(format!("{PREFIX}{}{SUFFIX}", encode_base64(chunk.as_bytes())));
            chunk.clear();
        }
        chunk.push(ch);
    }
    if !chunk.is_empty() {
        words.push(format!("{PREFIX}{}{SUFFIX}", encode_base64(chunk.as_bytes())));
    }

    words.join("\r\n ")
}
