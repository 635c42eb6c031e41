//! # mailmate-smtp
//!
//! SMTP submission client used by mailmate to hand finished messages to a
//! mail provider (RFC 5321 with the RFC 4954 AUTH extension).
//!
//! The client is generic over its transport stream, so the same session
//! code drives implicit TLS (port 465), STARTTLS-upgraded TCP (port 587)
//! and in-memory test streams.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailmate_smtp::{Address, Client, connection::connect_tls};
//!
//! let stream = connect_tls("smtp.gmail.com", 465).await?;
//! let client = Client::greet(stream).await?.ehlo("localhost").await?;
//! let mut client = client.authenticate("me@gmail.com", "app-password").await?;
//!
//! let from = Address::new("me@gmail.com")?;
//! let to = [Address::new("you@example.com")?];
//! client.send_mail(&from, &to, message_bytes).await?;
//! client.quit().await?;
//! ```
//!
//! ## Session States
//!
//! ```text
//! greet() ──→ Connected ── ehlo()/starttls() ──→ Connected
//!                 │
//!                 └── authenticate() ──→ Authenticated ── send_mail()* ── quit()
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use connection::{Authenticated, Client, Connected, ServerInfo};
pub use error::{Error, Result};
pub use types::{Address, AuthMechanism, Extension, Reply, ReplyCode};
