//! `POST /send-email`

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use sendwire_core::{DeliveryLog, EmailRequest, SettingsStore};
use sendwire_smtp::Connector;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailBody {
    /// The email to send.
    pub email_data: EmailRequest,
    /// Opaque correlation id; strings and numbers are both accepted.
    #[serde(default)]
    pub log_id: Option<Value>,
}

impl SendEmailBody {
    fn log_id(&self) -> Option<String> {
        match self.log_id.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Success body. Failures are rendered by [`ApiError`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Message-ID of the sent email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

/// POST /send-email
pub async fn send_email<S, L, C>(
    State(state): State<Arc<AppState<S, L, C>>>,
    body: Bytes,
) -> Result<Json<SendEmailResponse>, ApiError>
where
    S: SettingsStore,
    L: DeliveryLog,
    C: Connector + Clone,
{
    let body: SendEmailBody =
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;
    let log_id = body.log_id();

    tracing::debug!(to = %body.email_data.to, log_id = ?log_id, "Send request");

    let result = state
        .dispatcher
        .dispatch(log_id.as_deref(), &body.email_data)
        .await?;

    if result.success {
        Ok(Json(SendEmailResponse {
            success: true,
            message: "Email sent successfully".to_string(),
            message_id: result.message_id,
        }))
    } else {
        Err(ApiError::NotSent(result.error.unwrap_or_default()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> SendEmailBody {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn log_id_accepts_strings_and_numbers() {
        let data = json!({ "to": "b@example.com" });
        assert_eq!(
            body(json!({ "emailData": data, "logId": "abc" })).log_id(),
            Some("abc".to_string())
        );
        assert_eq!(
            body(json!({ "emailData": data, "logId": 42 })).log_id(),
            Some("42".to_string())
        );
        assert_eq!(body(json!({ "emailData": data, "logId": null })).log_id(), None);
        assert_eq!(body(json!({ "emailData": data })).log_id(), None);
    }

    #[test]
    fn response_omits_missing_message_id() {
        let response = SendEmailResponse {
            success: true,
            message: "Email sent successfully".into(),
            message_id: None,
        };
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({ "success": true, "message": "Email sent successfully" })
        );
    }
}
