//! Tests for the send-email endpoint.

#![allow(clippy::unwrap_used)]

mod common;

use axum::http::header::{ACCESS_CONTROL_REQUEST_METHOD, ORIGIN};
use axum::http::{HeaderValue, Method, StatusCode};
use common::{create_test_server, loopback_settings, spawn_smtp_server};
use sendwire_core::{DeliveryStatus, JsonSettingsFile, SmtpSettings, StaticSettings};
use serde_json::{Value, json};

fn payload(log_id: Value) -> Value {
    json!({
        "emailData": {
            "to": "b@example.com",
            "subject": "Hi",
            "body": "Hello\nWorld",
            "recipientName": "B"
        },
        "logId": log_id
    })
}

#[tokio::test]
async fn preflight_is_answered_with_cors_headers() {
    let (server, _) = create_test_server(StaticSettings(SmtpSettings::default()));

    let response = server
        .method(Method::OPTIONS, "/send-email")
        .add_header(ORIGIN, HeaderValue::from_static("http://localhost:3000"))
        .add_header(
            ACCESS_CONTROL_REQUEST_METHOD,
            HeaderValue::from_static("POST"),
        )
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.header("access-control-allow-origin"), "*");
    let allowed = response.header("access-control-allow-headers");
    let allowed = allowed.to_str().unwrap();
    for name in ["authorization", "x-client-info", "apikey", "content-type"] {
        assert!(allowed.contains(name), "{name} missing from {allowed}");
    }
    assert!(response.text().is_empty());
}

#[tokio::test]
async fn sent_email_returns_200_and_is_logged() {
    let port = spawn_smtp_server().await;
    let (server, state) = create_test_server(loopback_settings(port));

    let response = server
        .post("/send-email")
        .add_header(ORIGIN, HeaderValue::from_static("http://localhost:3000"))
        .json(&payload(json!("log-1")))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.header("access-control-allow-origin"), "*");
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Email sent successfully");
    let message_id = body["messageId"].as_str().unwrap();
    assert!(message_id.starts_with("sent_"));

    let entry = state.dispatcher.log().get("log-1").await.unwrap();
    assert_eq!(entry.status, DeliveryStatus::Sent);
    assert_eq!(entry.message_id.as_deref(), Some(message_id));
}

#[tokio::test]
async fn disabled_smtp_returns_400_and_marks_failure() {
    let (server, state) = create_test_server(StaticSettings(SmtpSettings::default()));

    let response = server.post("/send-email").json(&payload(json!(17))).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({
            "success": false,
            "message": "SMTP configuration error: SMTP is not enabled"
        })
    );

    let entry = state.dispatcher.log().get("17").await.unwrap();
    assert_eq!(entry.status, DeliveryStatus::Failed);
    assert_eq!(
        entry.error.as_deref(),
        Some("SMTP configuration error: SMTP is not enabled")
    );
}

#[tokio::test]
async fn unreachable_server_returns_400() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let (server, _) = create_test_server(loopback_settings(port));

    let response = server.post("/send-email").json(&payload(Value::Null)).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .starts_with("SMTP connection failed")
    );
}

#[tokio::test]
async fn malformed_body_returns_400() {
    let (server, state) = create_test_server(StaticSettings(SmtpSettings::default()));

    let response = server.post("/send-email").text("not json").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body: ")
    );

    let response = server.post("/send-email").json(&json!({ "logId": 1 })).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(state.dispatcher.log().count().await, 0);
}

#[tokio::test]
async fn unreadable_settings_return_500() {
    let path = std::env::temp_dir()
        .join(format!("sendwire-http-missing-{}.json", std::process::id()));
    let (server, state) = create_test_server(JsonSettingsFile::new(path));

    let response = server.post("/send-email").json(&payload(json!("x"))).await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({ "success": false, "message": "Internal server error" })
    );
    assert_eq!(state.dispatcher.log().count().await, 0);
}
