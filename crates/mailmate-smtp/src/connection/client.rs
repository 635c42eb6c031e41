//! Type-state SMTP client.

use std::marker::PhantomData;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

use super::ServerInfo;
use super::stream::{TlsStream, upgrade};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::types::{Address, AuthMechanism, Extension, Reply, ReplyCode};

/// Type-state marker: greeted, not yet authenticated.
#[derive(Debug)]
pub struct Connected;

/// Type-state marker: authenticated and ready for mail transactions.
#[derive(Debug)]
pub struct Authenticated;

/// SMTP client over stream `S` in session state `State`.
#[derive(Debug)]
pub struct Client<S, State> {
    stream: BufReader<S>,
    server_info: ServerInfo,
    _state: PhantomData<State>,
}

impl<S, State> Client<S, State> {
    /// Returns what the server told us about itself.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    fn transition<Next>(self) -> Client<S, Next> {
        Client {
            stream: self.stream,
            server_info: self.server_info,
            _state: PhantomData,
        }
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin, State> Client<S, State> {
    async fn send_command(&mut self, cmd: Command) -> Result<Reply> {
        if cmd.is_sensitive() {
            debug!("C: <credentials>");
        } else {
            debug!("C: {}", String::from_utf8_lossy(&cmd.serialize()).trim_end());
        }
        self.write_all(&cmd.serialize()).await?;
        self.read_reply().await
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let writer = self.stream.get_mut();
        writer.write_all(data).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn read_reply(&mut self) -> Result<Reply> {
        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            if self.stream.read_line(&mut line).await? == 0 {
                return Err(Error::ConnectionClosed);
            }

            let line = line.trim_end_matches(['\r', '\n']).to_string();
            if line.is_empty() {
                continue;
            }

            let is_last = is_last_reply_line(&line);
            lines.push(line);
            if is_last {
                break;
            }
        }

        let reply = parse_reply(&lines)?;
        debug!("S: {} {}", reply.code, reply.message_text());
        Ok(reply)
    }

    /// Sends QUIT and closes the session (available in any state).
    ///
    /// # Errors
    ///
    /// Returns an error if the server answers with something other than 221
    /// or a 2xx reply.
    pub async fn quit(mut self) -> Result<()> {
        let reply = self.send_command(Command::Quit).await?;
        if reply.code != ReplyCode::CLOSING {
            reply.expect_success()?;
        }
        Ok(())
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Client<S, Connected> {
    /// Wraps a fresh stream and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if the greeting cannot be read or is not 220.
    pub async fn greet(stream: S) -> Result<Self> {
        let mut client = Self {
            stream: BufReader::new(stream),
            server_info: ServerInfo::default(),
            _state: PhantomData,
        };

        let greeting = client
            .read_reply()
            .await?
            .expect_code(ReplyCode::SERVICE_READY)?;

        client.server_info.hostname = greeting
            .message
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();

        Ok(client)
    }

    /// Sends EHLO and records the advertised extensions.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects EHLO.
    pub async fn ehlo(mut self, client_hostname: &str) -> Result<Self> {
        let reply = self
            .send_command(Command::Ehlo {
                hostname: client_hostname.to_string(),
            })
            .await?
            .expect_success()?;

        // First line is the server's greeting text, the rest are keywords.
        self.server_info.extensions = reply
            .message
            .iter()
            .skip(1)
            .map(|line| Extension::parse(line))
            .collect();

        Ok(self)
    }

    /// Authenticates with the best mechanism the server offers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] if neither PLAIN nor LOGIN is
    /// advertised, or the server's rejection reply.
    pub async fn authenticate(
        self,
        username: &str,
        password: &str,
    ) -> Result<Client<S, Authenticated>> {
        match self.server_info.preferred_auth() {
            Some(AuthMechanism::Plain) => self.auth_plain(username, password).await,
            Some(AuthMechanism::Login) => self.auth_login(username, password).await,
            None => Err(Error::NotSupported("AUTH PLAIN or AUTH LOGIN".into())),
        }
    }

    /// Authenticates using PLAIN with an initial response.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails.
    pub async fn auth_plain(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<S, Authenticated>> {
        let credentials = format!("\0{username}\0{password}");
        self.send_command(Command::Auth {
            mechanism: AuthMechanism::Plain,
            initial_response: Some(STANDARD.encode(credentials.as_bytes())),
        })
        .await?
        .expect_code(ReplyCode::AUTH_OK)?;

        Ok(self.transition())
    }

    /// Authenticates using the LOGIN challenge exchange.
    ///
    /// # Errors
    ///
    /// Returns an error if any step of the exchange is rejected.
    pub async fn auth_login(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<S, Authenticated>> {
        self.send_command(Command::Auth {
            mechanism: AuthMechanism::Login,
            initial_response: None,
        })
        .await?
        .expect_code(ReplyCode::AUTH_CONTINUE)?;

        self.send_command(Command::AuthResponse(STANDARD.encode(username)))
            .await?
            .expect_code(ReplyCode::AUTH_CONTINUE)?;

        self.send_command(Command::AuthResponse(STANDARD.encode(password)))
            .await?
            .expect_code(ReplyCode::AUTH_OK)?;

        Ok(self.transition())
    }
}

impl Client<TcpStream, Connected> {
    /// Upgrades the session to TLS and repeats EHLO over the secure channel.
    ///
    /// # Errors
    ///
    /// Returns an error if STARTTLS is not offered, is refused, or the
    /// handshake fails.
    pub async fn starttls(
        mut self,
        server_hostname: &str,
        client_hostname: &str,
    ) -> Result<Client<TlsStream, Connected>> {
        if !self.server_info.supports_starttls() {
            return Err(Error::NotSupported("STARTTLS".into()));
        }

        self.send_command(Command::StartTls)
            .await?
            .expect_code(ReplyCode::SERVICE_READY)?;

        let tls = upgrade(self.stream.into_inner(), server_hostname).await?;
        let client = Client {
            stream: BufReader::new(tls),
            server_info: ServerInfo {
                hostname: self.server_info.hostname,
                extensions: Vec::new(),
            },
            _state: PhantomData,
        };

        client.ehlo(client_hostname).await
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Client<S, Authenticated> {
    /// Runs one complete mail transaction: MAIL FROM, RCPT TO for each
    /// recipient, DATA and the message itself.
    ///
    /// Line endings in `message` are normalized to CRLF, lines starting
    /// with `.` are dot-stuffed and the terminating `.` line is appended.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no recipients, the message exceeds the
    /// advertised SIZE, or the server rejects any step.
    pub async fn send_mail(
        &mut self,
        from: &Address,
        recipients: &[Address],
        message: &[u8],
    ) -> Result<()> {
        if recipients.is_empty() {
            return Err(Error::InvalidAddress("no recipients specified".into()));
        }
        if let Some(limit) = self
            .server_info
            .max_message_size()
            .filter(|&limit| limit > 0 && message.len() > limit)
        {
            return Err(Error::MessageTooLarge {
                size: message.len(),
                limit,
            });
        }

        let eight_bit = self.server_info.supports_8bitmime();
        self.send_command(Command::MailFrom {
            from: from.clone(),
            eight_bit,
        })
        .await?
        .expect_success()?;

        for rcpt in recipients {
            let reply = self
                .send_command(Command::RcptTo { to: rcpt.clone() })
                .await?;
            if !reply.is_success() {
                // Leave the session usable for a later transaction.
                let _ = self.send_command(Command::Rset).await;
                return Err(Error::from_reply(&reply));
            }
        }

        self.send_command(Command::Data)
            .await?
            .expect_code(ReplyCode::START_DATA)?;

        self.write_all(&dot_stuff(message)).await?;
        self.read_reply().await?.expect_success()?;

        Ok(())
    }
}

/// Normalizes line endings to CRLF, escapes leading dots and appends the
/// end-of-data marker.
fn dot_stuff(message: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + 16);

    let body = message.strip_suffix(b"\n").unwrap_or(message);
    let body = body.strip_suffix(b"\r").unwrap_or(body);

    for line in body.split(|&b| b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.first() == Some(&b'.') {
            out.push(b'.');
        }
        out.extend_from_slice(line);
        out.extend_from_slice(b"\r\n");
    }

    out.extend_from_slice(b".\r\n");
    out
}
