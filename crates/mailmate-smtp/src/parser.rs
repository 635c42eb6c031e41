//! SMTP reply parser.

use crate::error::{Error, Result};
use crate::types::{Reply, ReplyCode};

/// Returns true if `line` terminates a reply.
///
/// Continuation lines carry a `-` after the code (`250-SIZE`), the final
/// line a space or nothing (`250 OK`, `250`).
#[must_use]
pub fn is_last_reply_line(line: &str) -> bool {
    line.as_bytes().get(3).is_none_or(|&b| b != b'-')
}

/// Parses a reply from its raw lines (CRLF already stripped).
///
/// # Errors
///
/// Returns an error if there are no lines, a line is shorter than three
/// characters, the code is not numeric, or the lines disagree on the code.
pub fn parse_reply(lines: &[String]) -> Result<Reply> {
    let first = lines
        .first()
        .ok_or_else(|| Error::Protocol("empty reply".into()))?;
    let code = parse_code(first)?;

    let mut message = Vec::with_capacity(lines.len());
    for line in lines {
        if parse_code(line)? != code {
            return Err(Error::Protocol(format!(
                "reply code changed mid-reply: {line}"
            )));
        }
        message.push(line.get(4..).unwrap_or_default().to_string());
    }

    Ok(Reply::new(ReplyCode::new(code), message))
}

fn parse_code(line: &str) -> Result<u16> {
    line.get(..3)
        .filter(|code| code.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|code| code.parse().ok())
        .ok_or_else(|| Error::Protocol(format!("invalid reply line: {line}")))
}
