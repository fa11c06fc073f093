//! One SMTP conversation over one connection.

use super::{Connector, ServerInfo, SmtpStream};
use crate::command::{Command, encode_data};
use crate::error::{Error, Result};
use crate::parser::{parse_reply, parse_reply_line};
use crate::types::{Extension, Reply};
use std::time::Duration;
use tokio::time::timeout;

/// Upper bound on reply lines, so a hostile server cannot grow a reply forever.
const MAX_REPLY_LINES: usize = 512;

/// Wait for the server's answer to QUIT during teardown.
const QUIT_TIMEOUT: Duration = Duration::from_secs(2);

/// An open SMTP connection and what the server told us about itself.
#[derive(Debug)]
pub struct Session {
    stream: SmtpStream,
    server_info: ServerInfo,
}

impl Session {
    /// Opens a connection to `host:port`, wrapping it in TLS first when `implicit_tls` is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connect`] if the socket cannot be opened, or a timeout
    /// if connecting or the handshake exceeds `connect_timeout`.
    pub async fn open<C: Connector>(
        connector: &C,
        host: &str,
        port: u16,
        implicit_tls: bool,
        connect_timeout: Duration,
        io_timeout: Duration,
    ) -> Result<Self> {
        let io = timeout(connect_timeout, async {
            let io = connector.connect(host, port).await.map_err(Error::Connect)?;
            if implicit_tls {
                connector.handshake(io, host).await
            } else {
                Ok(io)
            }
        })
        .await
        .map_err(|_| Error::Timeout {
            during: "SMTP connection failed",
            after: connect_timeout,
        })??;

        Ok(Self {
            stream: SmtpStream::new(io, implicit_tls, io_timeout),
            server_info: ServerInfo::default(),
        })
    }

    /// Builds a session on an already connected stream.
    #[must_use]
    pub fn from_stream(stream: SmtpStream) -> Self {
        Self {
            stream,
            server_info: ServerInfo::default(),
        }
    }

    /// Returns the server information gathered so far.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Returns true if the conversation is currently encrypted.
    #[must_use]
    pub const fn is_encrypted(&self) -> bool {
        self.stream.is_encrypted()
    }

    /// Reads a complete (possibly multi-line) reply.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails, or [`Error::MalformedReply`] as soon
    /// as a line is not a reply line.
    pub async fn read_reply(&mut self) -> Result<Reply> {
        let mut lines = Vec::new();
        loop {
            let line = self.stream.read_line().await?;
            let Ok(parsed) = parse_reply_line(&line) else {
                return Err(Error::malformed(line));
            };
            lines.push(line);

            if !parsed.is_continuation {
                break;
            }
            if lines.len() >= MAX_REPLY_LINES {
                return Err(Error::Protocol("Reply has too many lines".into()));
            }
        }

        parse_reply(&lines)
    }

    /// Sends a command and reads its reply.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or reading fails.
    pub async fn send_command(&mut self, cmd: &Command) -> Result<Reply> {
        self.stream.write_all(&cmd.serialize()).await?;
        self.read_reply().await
    }

    /// Streams a message after `354` and reads the final reply.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transmission`] if the connection breaks while the
    /// body is written; reading the reply fails like any other step.
    pub async fn send_payload(&mut self, message: &[u8]) -> Result<Reply> {
        let data = encode_data(message);
        self.stream.write_all(&data).await.map_err(|e| match e {
            Error::Io(io) => Error::Transmission(io),
            other => other,
        })?;
        self.read_reply().await
    }

    /// Remembers the extensions advertised in an EHLO reply.
    ///
    /// The first line of the reply is the server greeting, not an extension.
    pub fn record_extensions(&mut self, reply: &Reply) {
        if let Some(greeting) = reply.message.first() {
            self.server_info.hostname = greeting
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string();
        }
        self.server_info.extensions = reply
            .message
            .iter()
            .skip(1)
            .map(|line| Extension::parse(line))
            .collect();
    }

    /// Replaces the plaintext stream with a TLS one after a `220` STARTTLS reply.
    ///
    /// The plaintext stream is consumed and everything learned over it is
    /// forgotten; the caller must issue EHLO again.
    ///
    /// # Errors
    ///
    /// Returns an error if plaintext data is pending or the handshake fails.
    pub async fn upgrade<C: Connector>(
        self,
        connector: &C,
        host: &str,
        connect_timeout: Duration,
        io_timeout: Duration,
    ) -> Result<Self> {
        let io = self.stream.into_io()?;
        let io = timeout(connect_timeout, connector.handshake(io, host))
            .await
            .map_err(|_| Error::Timeout {
                during: "TLS handshake",
                after: connect_timeout,
            })??;

        Ok(Self {
            stream: SmtpStream::new(io, true, io_timeout),
            server_info: ServerInfo::default(),
        })
    }

    /// Sends QUIT and closes the connection. The server's answer is not checked.
    pub async fn quit(mut self) {
        let _ = timeout(QUIT_TIMEOUT, self.send_command(&Command::Quit)).await;
        self.stream.shutdown().await;
    }
}
