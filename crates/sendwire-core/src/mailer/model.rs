//! Request and result shapes of a send.

use serde::{Deserialize, Serialize};

/// One email to send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    #[serde(default)]
    pub subject: String,
    /// Plain text or simple HTML with newlines.
    #[serde(default)]
    pub body: String,
    /// Display name for the `To:` header.
    #[serde(default)]
    pub recipient_name: String,
}

impl EmailRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(
        to: impl Into<String>,
        recipient_name: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            recipient_name: recipient_name.into(),
        }
    }
}

/// Outcome of a send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    /// Whether the server accepted the message.
    pub success: bool,
    /// Server-echoed Message-ID, or a local `sent_<ms>` token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// What went wrong.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendResult {
    /// A successful send.
    #[must_use]
    pub fn sent(message_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message_id: Some(message_id.into()),
            error: None,
        }
    }

    /// A failed send.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}
