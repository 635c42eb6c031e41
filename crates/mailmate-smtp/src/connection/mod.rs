//! SMTP connection management with the type-state pattern.

mod client;
mod stream;

pub use client::{Authenticated, Client, Connected};
pub use stream::{TlsStream, connect, connect_tls};

use crate::types::{AuthMechanism, Extension};

/// Server identity and capabilities learned from the greeting and EHLO.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    /// Server hostname from the greeting line.
    pub hostname: String,
    /// Extensions from the most recent EHLO reply.
    pub extensions: Vec<Extension>,
}

impl ServerInfo {
    /// Checks if the server advertised an extension.
    #[must_use]
    pub fn supports(&self, ext: &Extension) -> bool {
        self.extensions.contains(ext)
    }

    /// Checks if STARTTLS is offered.
    #[must_use]
    pub fn supports_starttls(&self) -> bool {
        self.supports(&Extension::StartTls)
    }

    /// Checks if the server accepts 8-bit message bodies.
    #[must_use]
    pub fn supports_8bitmime(&self) -> bool {
        self.supports(&Extension::EightBitMime)
    }

    /// Returns the maximum message size, if advertised.
    #[must_use]
    pub fn max_message_size(&self) -> Option<usize> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Size(size) => *size,
            _ => None,
        })
    }

    /// Picks the mechanism to authenticate with, preferring PLAIN.
    #[must_use]
    pub fn preferred_auth(&self) -> Option<AuthMechanism> {
        let advertised: Vec<&str> = self
            .extensions
            .iter()
            .filter_map(|ext| match ext {
                Extension::Auth(mechs) => Some(mechs.iter().map(String::as_str)),
                _ => None,
            })
            .flatten()
            .collect();

        if advertised.contains(&"PLAIN") {
            Some(AuthMechanism::Plain)
        } else if advertised.contains(&"LOGIN") {
            Some(AuthMechanism::Login)
        } else {
            None
        }
    }
}
