//! Test server and a loopback SMTP server.

#![allow(dead_code, clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum_test::TestServer;
use sendwire::{AppState, create_router};
use sendwire_core::{
    Dispatcher, Encryption, Mailer, MemoryDeliveryLog, SettingsStore, SmtpSettings,
    StaticSettings,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

pub type State<S> = Arc<AppState<S, MemoryDeliveryLog>>;

/// Creates a test server over `settings`, returning the state for log inspection.
pub fn create_test_server<S: SettingsStore + 'static>(settings: S) -> (TestServer, State<S>) {
    let state = Arc::new(AppState::new(Dispatcher::new(
        settings,
        MemoryDeliveryLog::new(),
        Mailer::new(),
    )));
    let server = TestServer::new(create_router(Arc::clone(&state))).unwrap();
    (server, state)
}

/// Valid settings pointing at a plaintext server on `127.0.0.1:port`.
pub fn loopback_settings(port: u16) -> StaticSettings {
    StaticSettings(SmtpSettings {
        enabled: true,
        host: "127.0.0.1".into(),
        port,
        username: "u".into(),
        password: "p".into(),
        from_email: "a@example.com".into(),
        from_name: "A".into(),
        encryption: Encryption::None,
        ..SmtpSettings::default()
    })
}

/// Starts an SMTP server that accepts one message, returning its port.
pub async fn spawn_smtp_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut stream = BufReader::new(stream);
        let mut auth = 0;
        reply(&mut stream, "220 loopback ESMTP").await;

        let mut line = String::new();
        loop {
            line.clear();
            if stream.read_line(&mut line).await.unwrap_or(0) == 0 {
                return;
            }
            let command = line.trim_end().to_string();
            let answer = if auth > 0 {
                auth -= 1;
                if auth == 0 { "235 2.7.0 Accepted" } else { "334 UGFzc3dvcmQ6" }
            } else if command.starts_with("EHLO") {
                "250-loopback\r\n250 AUTH LOGIN"
            } else if command == "AUTH LOGIN" {
                auth = 2;
                "334 VXNlcm5hbWU6"
            } else if command == "DATA" {
                reply(&mut stream, "354 End data with <CR><LF>.<CR><LF>").await;
                loop {
                    line.clear();
                    if stream.read_line(&mut line).await.unwrap_or(0) == 0 || line == ".\r\n" {
                        break;
                    }
                }
                "250 2.0.0 Ok: queued"
            } else if command == "QUIT" {
                reply(&mut stream, "221 Bye").await;
                return;
            } else {
                "250 Ok"
            };
            reply(&mut stream, answer).await;
        }
    });

    port
}

async fn reply(stream: &mut BufReader<tokio::net::TcpStream>, text: &str) {
    let _ = stream
        .get_mut()
        .write_all(format!("{text}\r\n").as_bytes())
        .await;
}
