//! Single-shot message submission.
//!
//! [`SmtpTransport::send`] opens a fresh connection, walks [`STEPS`] in
//! order, and closes the connection again. Nothing is kept between calls,
//! so one transport can serve concurrent sends.

mod config;
mod steps;

pub use config::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_IO_TIMEOUT, Security, TransportConfig,
    TransportConfigBuilder,
};
pub use steps::{STEPS, Stage, Step, plan};

use crate::command::Command;
use crate::connection::{Connector, RustlsConnector, Session};
use crate::error::{Error, Result};
use crate::types::{Address, AuthMechanism, Reply};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Username and password for AUTH LOGIN.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Envelope sender and recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// `MAIL FROM` address.
    pub from: Address,
    /// `RCPT TO` address.
    pub to: Address,
}

impl Envelope {
    /// Creates an envelope.
    #[must_use]
    pub const fn new(from: Address, to: Address) -> Self {
        Self { from, to }
    }
}

/// Outcome of an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// The server's final reply to the message data.
    pub reply: Reply,
    /// Message-ID echoed by the server, if it sent one.
    pub message_id: Option<String>,
}

/// What a stage puts on the wire.
enum Action {
    ReadGreeting,
    Send(Command),
    SendPayload,
}

/// SMTP client that submits one message per call.
#[derive(Debug, Clone)]
pub struct SmtpTransport<C = RustlsConnector> {
    config: TransportConfig,
    connector: C,
}

impl SmtpTransport {
    /// Creates a transport that connects over TCP with rustls.
    #[must_use]
    pub fn new(config: TransportConfig) -> Self {
        Self::with_connector(config, RustlsConnector::new())
    }
}

impl<C: Connector> SmtpTransport<C> {
    /// Creates a transport using a custom connector.
    #[must_use]
    pub const fn with_connector(config: TransportConfig, connector: C) -> Self {
        Self { config, connector }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Submits `message` to the server.
    ///
    /// The message must already be a complete RFC 5322 document; line
    /// endings are normalized and dot-stuffing is applied on the wire.
    ///
    /// # Errors
    ///
    /// Returns the first failure. A step answered with the wrong code yields
    /// [`Error::Rejected`] carrying the step's failure label and the raw reply.
    pub async fn send(
        &self,
        credentials: &Credentials,
        envelope: &Envelope,
        message: &[u8],
    ) -> Result<Delivery> {
        let config = &self.config;
        debug!(
            host = %config.host,
            port = config.port,
            security = ?config.security,
            "Connecting to SMTP server"
        );

        let mut session = Session::open(
            &self.connector,
            &config.host,
            config.port,
            config.security == Security::Implicit,
            config.connect_timeout,
            config.io_timeout,
        )
        .await?;

        let mut final_reply = None;

        for step in plan(config.security) {
            match self.skip(step.stage, &session) {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    session.quit().await;
                    return Err(e);
                }
            }

            let action = self.action(step.stage, credentials, envelope);
            let reply = match action {
                Action::ReadGreeting => session.read_reply().await,
                Action::Send(cmd) => session.send_command(&cmd).await,
                Action::SendPayload => session.send_payload(message).await,
            }
            .map_err(|e| e.during(step.failure))?;

            if reply.code != step.expect {
                warn!(
                    stage = step.stage.name(),
                    expected = step.expect.as_u16(),
                    code = reply.code.as_u16(),
                    reply = %reply,
                    "SMTP server rejected step"
                );
                session.quit().await;
                return Err(Error::rejected(step.failure, reply));
            }
            debug!(stage = step.stage.name(), code = reply.code.as_u16(), "SMTP step ok");

            match step.stage {
                Stage::Ehlo | Stage::EhloAfterTls => {
                    session.record_extensions(&reply);
                    if !session.server_info().supports_auth_login() {
                        debug!(
                            mechanisms = ?session.server_info().auth_mechanisms(),
                            "Server does not advertise AUTH LOGIN"
                        );
                    }
                }
                Stage::StartTls => {
                    session = session
                        .upgrade(
                            &self.connector,
                            &config.host,
                            config.connect_timeout,
                            config.io_timeout,
                        )
                        .await
                        .map_err(|e| e.during(step.failure))?;
                    debug!("Connection upgraded to TLS");
                }
                Stage::Payload => final_reply = Some(reply),
                _ => {}
            }
        }

        session.quit().await;

        let reply =
            final_reply.ok_or_else(|| Error::Protocol("Message was never transmitted".into()))?;
        Ok(Delivery {
            message_id: reply.message_id(),
            reply,
        })
    }

    /// Like [`send`](Self::send), but gives up as soon as `token` is cancelled.
    ///
    /// Cancelling drops the connection wherever the dialogue happens to be.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] on cancellation, otherwise as [`send`](Self::send).
    pub async fn send_cancellable(
        &self,
        credentials: &Credentials,
        envelope: &Envelope,
        message: &[u8],
        token: &CancellationToken,
    ) -> Result<Delivery> {
        tokio::select! {
            biased;
            () = token.cancelled() => {
                warn!(host = %self.config.host, "SMTP send cancelled");
                Err(Error::Cancelled)
            }
            result = self.send(credentials, envelope, message) => result,
        }
    }

    /// STARTTLS only runs when offered, and the second EHLO only over TLS.
    fn skip(&self, stage: Stage, session: &Session) -> Result<bool> {
        match stage {
            Stage::StartTls if !session.server_info().supports_starttls() => {
                if self.config.require_tls {
                    return Err(Error::StartTlsUnavailable);
                }
                warn!(
                    host = %self.config.host,
                    "Server does not advertise STARTTLS; continuing without TLS"
                );
                Ok(true)
            }
            Stage::EhloAfterTls => Ok(!session.is_encrypted()),
            _ => Ok(false),
        }
    }

    fn action(&self, stage: Stage, credentials: &Credentials, envelope: &Envelope) -> Action {
        match stage {
            Stage::Greeting => Action::ReadGreeting,
            Stage::Ehlo | Stage::EhloAfterTls => Action::Send(Command::Ehlo {
                hostname: self.config.client_name.clone(),
            }),
            Stage::StartTls => Action::Send(Command::StartTls),
            Stage::AuthLogin => Action::Send(Command::Auth {
                mechanism: AuthMechanism::Login,
            }),
            Stage::Username => {
                Action::Send(Command::AuthResponse(STANDARD.encode(&credentials.username)))
            }
            Stage::Password => {
                Action::Send(Command::AuthResponse(STANDARD.encode(&credentials.password)))
            }
            Stage::MailFrom => Action::Send(Command::MailFrom {
                from: envelope.from.clone(),
            }),
            Stage::RcptTo => Action::Send(Command::RcptTo {
                to: envelope.to.clone(),
            }),
            Stage::Data => Action::Send(Command::Data),
            Stage::Payload => Action::SendPayload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("user", "hunter2");
        let shown = format!("{creds:?}");
        assert!(shown.contains("user"));
        assert!(!shown.contains("hunter2"));
        assert_eq!(creds.username(), "user");
    }
}
