//! In-memory SMTP server for exercising the send workflow.

#![allow(dead_code, clippy::unwrap_used, clippy::missing_panics_doc)]

use sendwire_core::{Encryption, SmtpSettings};
use sendwire_smtp::connection::BoxedIo;
use sendwire_smtp::{Connector, Result};
use std::io;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

/// What the stub server saw.
#[derive(Debug, Default)]
pub struct Seen {
    pub transcript: Vec<String>,
    pub message: String,
    pub connects: usize,
}

/// Connector whose every connection reaches an accept-everything server.
#[derive(Debug, Clone, Default)]
pub struct StubConnector {
    /// `(line prefix, reply)` overrides.
    pub rejections: Vec<(String, String)>,
    /// Final reply to DATA.
    pub queued: Option<String>,
    pub seen: Arc<Mutex<Seen>>,
}

impl StubConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject(mut self, prefix: &str, reply: &str) -> Self {
        self.rejections.push((prefix.into(), reply.into()));
        self
    }

    pub fn queued(mut self, reply: &str) -> Self {
        self.queued = Some(reply.into());
        self
    }

    pub fn transcript(&self) -> Vec<String> {
        self.seen.lock().unwrap().transcript.clone()
    }

    pub fn message(&self) -> String {
        self.seen.lock().unwrap().message.clone()
    }

    pub fn connects(&self) -> usize {
        self.seen.lock().unwrap().connects
    }

    async fn serve(self, io: DuplexStream) {
        let mut reader = BufReader::new(io);
        let mut tls = false;
        let mut auth_lines = 0u8;
        write(&mut reader, "220 stub.example.com ESMTP").await;

        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                return;
            }
            let command = line.trim_end().to_string();
            self.seen.lock().unwrap().transcript.push(command.clone());

            if let Some((_, reply)) = self
                .rejections
                .iter()
                .find(|(prefix, _)| command.starts_with(prefix.as_str()))
            {
                write(&mut reader, reply).await;
                continue;
            }

            let reply = match command.as_str() {
                _ if auth_lines == 1 => {
                    auth_lines = 2;
                    "334 UGFzc3dvcmQ6".to_string()
                }
                _ if auth_lines == 2 => {
                    auth_lines = 0;
                    "235 2.7.0 Accepted".to_string()
                }
                c if c.starts_with("EHLO") && !tls => {
                    "250-stub.example.com\r\n250-STARTTLS\r\n250 AUTH LOGIN".to_string()
                }
                c if c.starts_with("EHLO") => "250-stub.example.com\r\n250 AUTH LOGIN".to_string(),
                "STARTTLS" => {
                    tls = true;
                    "220 Go ahead".to_string()
                }
                "AUTH LOGIN" => {
                    auth_lines = 1;
                    "334 VXNlcm5hbWU6".to_string()
                }
                "DATA" => {
                    write(&mut reader, "354 Go ahead").await;
                    let mut message = String::new();
                    loop {
                        line.clear();
                        if reader.read_line(&mut line).await.unwrap_or(0) == 0 || line == ".\r\n" {
                            break;
                        }
                        message.push_str(&line);
                    }
                    {
                        let mut seen = self.seen.lock().unwrap();
                        seen.message = message;
                        seen.transcript.push("<message>".into());
                    }
                    self.queued.clone().unwrap_or_else(|| "250 2.0.0 Ok: queued".into())
                }
                "QUIT" => {
                    write(&mut reader, "221 Bye").await;
                    return;
                }
                _ => "250 Ok".to_string(),
            };
            write(&mut reader, &reply).await;
        }
    }
}

async fn write(reader: &mut BufReader<DuplexStream>, text: &str) {
    let io = reader.get_mut();
    let _ = io.write_all(format!("{text}\r\n").as_bytes()).await;
    let _ = io.flush().await;
}

impl Connector for StubConnector {
    async fn connect(&self, _host: &str, _port: u16) -> io::Result<BoxedIo> {
        let (client, server) = tokio::io::duplex(64 * 1024);
        self.seen.lock().unwrap().connects += 1;
        tokio::spawn(self.clone().serve(server));
        Ok(Box::new(client))
    }

    async fn handshake(&self, io: BoxedIo, _host: &str) -> Result<BoxedIo> {
        self.seen.lock().unwrap().transcript.push("<tls>".into());
        Ok(io)
    }
}

/// The settings of the reference scenario.
pub fn settings() -> SmtpSettings {
    SmtpSettings {
        enabled: true,
        host: "smtp.example.com".into(),
        port: 587,
        username: "u".into(),
        password: "p".into(),
        from_email: "a@example.com".into(),
        from_name: "A".into(),
        encryption: Encryption::Tls,
        ..SmtpSettings::default()
    }
}
