//! The send operation: validate, build, submit, map the outcome.

mod model;

pub use model::{EmailRequest, SendResult};

use crate::error::SendError;
use crate::settings::{SmtpSettings, validate_settings};
use chrono::Utc;
use sendwire_mime::MessageBuilder;
use sendwire_smtp::{Address, Connector, Envelope, RustlsConnector, SmtpTransport};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Sends one email per call over a fresh connection.
///
/// Holds no state between calls; clones share only the connector.
#[derive(Debug, Clone, Default)]
pub struct Mailer<C = RustlsConnector> {
    connector: C,
}

impl Mailer {
    /// Creates a mailer that connects over TCP with rustls.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Connector + Clone> Mailer<C> {
    /// Creates a mailer using a custom connector.
    #[must_use]
    pub const fn with_connector(connector: C) -> Self {
        Self { connector }
    }

    /// Sends `request` with `settings` and reports the outcome.
    ///
    /// Never fails: every error becomes a [`SendResult`] with `success: false`.
    pub async fn send(&self, settings: &SmtpSettings, request: &EmailRequest) -> SendResult {
        self.send_cancellable(settings, request, &CancellationToken::new())
            .await
    }

    /// Like [`send`](Self::send), but abandons the conversation when `token` is cancelled.
    pub async fn send_cancellable(
        &self,
        settings: &SmtpSettings,
        request: &EmailRequest,
        token: &CancellationToken,
    ) -> SendResult {
        match self.try_send(settings, request, token).await {
            Ok(message_id) => {
                info!(to = %request.to, message_id = %message_id, "Email sent");
                SendResult::sent(message_id)
            }
            Err(e) => {
                warn!(to = %request.to, error = %e, "Email not sent");
                SendResult::failed(e.to_string())
            }
        }
    }

    /// Sends `request` and returns the Message-ID, keeping the typed error.
    ///
    /// Invalid settings are rejected before any connection is opened.
    ///
    /// # Errors
    ///
    /// Returns [`SendError`] describing the first failure.
    pub async fn try_send(
        &self,
        settings: &SmtpSettings,
        request: &EmailRequest,
        token: &CancellationToken,
    ) -> Result<String, SendError> {
        validate_settings(settings).map_err(SendError::Config)?;

        let from = Address::new(settings.from_email.trim())?;
        let to = Address::new(request.to.trim())?;

        let message = MessageBuilder::new()
            .from(settings.from_name.as_str(), from.as_str())
            .to(request.recipient_name.as_str(), to.as_str())
            .subject(request.subject.as_str())
            .body(&request.body)
            .message_id_host(settings.host.trim())
            .build()?;
        debug!(
            message_id = message.message_id(),
            boundary = message.boundary(),
            "Message built"
        );

        let transport =
            SmtpTransport::with_connector(settings.transport_config(), self.connector.clone());
        let delivery = transport
            .send_cancellable(
                &settings.credentials(),
                &Envelope::new(from, to),
                &message.to_bytes(),
                token,
            )
            .await?;

        Ok(delivery.message_id.unwrap_or_else(local_message_id))
    }
}

/// Correlation token used when the server does not echo a Message-ID.
fn local_message_id() -> String {
    format!("sent_{}", Utc::now().timestamp_millis())
}
