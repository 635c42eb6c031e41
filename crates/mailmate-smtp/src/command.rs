//! SMTP command serialization.

use crate::types::{Address, AuthMechanism};

/// A command sent by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// EHLO - Extended greeting
    Ehlo {
        /// Client hostname
        hostname: String,
    },
    /// STARTTLS - Upgrade to TLS
    StartTls,
    /// AUTH - Begin authentication
    Auth {
        /// Mechanism
        mechanism: AuthMechanism,
        /// Initial response (SASL-IR), already base64 encoded
        initial_response: Option<String>,
    },
    /// A bare base64 line answering a 334 challenge
    AuthResponse(String),
    /// MAIL FROM - Start mail transaction
    MailFrom {
        /// Sender address
        from: Address,
        /// Request 8BITMIME body handling
        eight_bit: bool,
    },
    /// RCPT TO - Add recipient
    RcptTo {
        /// Recipient address
        to: Address,
    },
    /// DATA - Begin message data
    Data,
    /// RSET - Abort the current transaction
    Rset,
    /// QUIT - Close connection
    Quit,
}

impl Command {
    /// Serializes the command, including the trailing CRLF.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let line = match self {
            Self::Ehlo { hostname } => format!("EHLO {hostname}"),
            Self::StartTls => "STARTTLS".to_string(),
            Self::Auth {
                mechanism,
                initial_response: Some(resp),
            } => format!("AUTH {} {resp}", mechanism.as_str()),
            Self::Auth {
                mechanism,
                initial_response: None,
            } => format!("AUTH {}", mechanism.as_str()),
            Self::AuthResponse(resp) => resp.clone(),
            Self::MailFrom { from, eight_bit } => {
                if *eight_bit {
                    format!("MAIL FROM:<{from}> BODY=8BITMIME")
                } else {
                    format!("MAIL FROM:<{from}>")
                }
            }
            Self::RcptTo { to } => format!("RCPT TO:<{to}>"),
            Self::Data => "DATA".to_string(),
            Self::Rset => "RSET".to_string(),
            Self::Quit => "QUIT".to_string(),
        };

        let mut buf = line.into_bytes();
        buf.extend_from_slice(b"\r\n");
        buf
    }

    /// Returns true if the serialized form carries credentials.
    #[must_use]
    pub const fn is_sensitive(&self) -> bool {
        matches!(
            self,
            Self::AuthResponse(_)
                | Self::Auth {
                    initial_response: Some(_),
                    ..
                }
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ehlo_command() {
        let cmd = Command::Ehlo {
            hostname: "localhost".to_string(),
        };
        assert_eq!(cmd.serialize(), b"EHLO localhost\r\n");
    }

    #[test]
    fn test_auth_plain_with_initial_response() {
        let cmd = Command::Auth {
            mechanism: AuthMechanism::Plain,
            initial_response: Some("AHVzZXIAcGFzcw==".to_string()),
        };
        assert_eq!(cmd.serialize(), b"AUTH PLAIN AHVzZXIAcGFzcw==\r\n");
        assert!(cmd.is_sensitive());
    }

    #[test]
    fn test_auth_login_without_initial_response() {
        let cmd = Command::Auth {
            mechanism: AuthMechanism::Login,
            initial_response: None,
        };
        assert_eq!(cmd.serialize(), b"AUTH LOGIN\r\n");
        assert!(!cmd.is_sensitive());
    }

    #[test]
    fn test_mail_from() {
        let from = Address::new("sender@example.com").unwrap();
        let plain = Command::MailFrom {
            from: from.clone(),
            eight_bit: false,
        };
        assert_eq!(plain.serialize(), b"MAIL FROM:<sender@example.com>\r\n");

        let eight_bit = Command::MailFrom {
            from,
            eight_bit: true,
        };
        assert_eq!(
            eight_bit.serialize(),
            b"MAIL FROM:<sender@example.com> BODY=8BITMIME\r\n"
        );
    }

    #[test]
    fn test_rcpt_to() {
        let cmd = Command::RcptTo {
            to: Address::new("recipient@example.com").unwrap(),
        };
        assert_eq!(cmd.serialize(), b"RCPT TO:<recipient@example.com>\r\n");
    }
}
