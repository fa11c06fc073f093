//! The email-dispatch workflow: load settings, send, record the outcome.

mod log;

pub use log::{
    DeliveryLog, DeliveryStatus, JsonlDeliveryLog, LogEntry, LogError, MemoryDeliveryLog,
};

use crate::error::DispatchError;
use crate::mailer::{EmailRequest, Mailer, SendResult};
use crate::settings::SettingsStore;
use chrono::Utc;
use sendwire_smtp::{Connector, RustlsConnector};
use tracing::{debug, error};

/// Ties a settings store, a mailer and a delivery log together.
#[derive(Debug)]
pub struct Dispatcher<S, L, C = RustlsConnector> {
    settings: S,
    log: L,
    mailer: Mailer<C>,
}

impl<S, L, C> Dispatcher<S, L, C>
where
    S: SettingsStore,
    L: DeliveryLog,
    C: Connector + Clone,
{
    /// Creates a dispatcher.
    #[must_use]
    pub const fn new(settings: S, log: L, mailer: Mailer<C>) -> Self {
        Self {
            settings,
            log,
            mailer,
        }
    }

    /// The delivery log.
    #[must_use]
    pub const fn log(&self) -> &L {
        &self.log
    }

    /// Sends `request` with freshly loaded settings and records the outcome under `log_id`.
    ///
    /// A failed send is a normal [`SendResult`]; only problems with the
    /// workflow itself are errors. Once the send has been attempted its
    /// result is returned even if the log cannot be updated.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if settings cannot be loaded.
    pub async fn dispatch(
        &self,
        log_id: Option<&str>,
        request: &EmailRequest,
    ) -> Result<SendResult, DispatchError> {
        let settings = self.settings.load().await.inspect_err(|e| {
            error!(error = %e, "Cannot load SMTP settings");
        })?;

        let result = self.mailer.send(&settings, request).await;

        if let Some(log_id) = log_id {
            debug!(log_id, success = result.success, "Updating delivery log");
            let updated = if result.success {
                self.log
                    .mark_sent(log_id, Utc::now(), result.message_id.as_deref())
                    .await
            } else {
                self.log
                    .mark_failed(log_id, result.error.as_deref().unwrap_or_default())
                    .await
            };
            if let Err(e) = updated {
                error!(log_id, error = %e, "Cannot update delivery log");
            }
        }

        Ok(result)
    }
}
