//! Scripted SMTP server and an in-memory connector for integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::missing_panics_doc)]

use sendwire_smtp::connection::BoxedIo;
use sendwire_smtp::{Connector, Error, Result};
use std::io;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// How the stub server behaves.
#[derive(Debug, Clone)]
pub struct Script {
    /// Greeting line; `None` keeps the server silent.
    pub greeting: Option<String>,
    /// Advertise STARTTLS before the upgrade.
    pub starttls: bool,
    /// `(line prefix, reply)`: answer a matching client line with `reply`.
    pub rejections: Vec<(String, String)>,
    /// Like `rejections`, but only once STARTTLS has been accepted.
    pub tls_rejections: Vec<(String, String)>,
    /// Make every TLS handshake fail.
    pub tls_fails: bool,
    /// Reply to the end of the message data.
    pub queued: String,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            greeting: Some("220 stub.example.com ESMTP ready".into()),
            starttls: true,
            rejections: Vec::new(),
            tls_rejections: Vec::new(),
            tls_fails: false,
            queued: "250 2.0.0 Ok: queued".into(),
        }
    }
}

impl Script {
    pub fn reject(mut self, prefix: &str, reply: &str) -> Self {
        self.rejections.push((prefix.into(), reply.into()));
        self
    }

    pub fn reject_after_tls(mut self, prefix: &str, reply: &str) -> Self {
        self.tls_rejections.push((prefix.into(), reply.into()));
        self
    }
}

/// Everything the server and connector observed.
#[derive(Debug, Default)]
pub struct Observed {
    /// Client lines in arrival order; `<tls>` marks a handshake and
    /// `<message>` the end of the data.
    pub transcript: Vec<String>,
    /// Message data as received, lines joined with `\n`.
    pub body: String,
    pub connects: usize,
}

pub type Shared = Arc<Mutex<Observed>>;

/// Runs one scripted session over `io` until QUIT or EOF.
pub async fn serve<S>(io: S, script: Script, observed: Shared)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(io);
    let mut tls_done = false;
    let mut auth_stage = 0u8;

    if let Some(greeting) = &script.greeting {
        reply(&mut reader, greeting).await;
    }

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
            return;
        }
        let command = line.trim_end_matches(['\r', '\n']).to_string();
        observed.lock().unwrap().transcript.push(command.clone());

        let after_tls = script.tls_rejections.iter().filter(|_| tls_done);
        if let Some((_, rejection)) = script
            .rejections
            .iter()
            .chain(after_tls)
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
        {
            reply(&mut reader, rejection).await;
            continue;
        }

        let upper = command.to_ascii_uppercase();
        let answer = if auth_stage == 1 {
            auth_stage = 2;
            "334 UGFzc3dvcmQ6".to_string()
        } else if auth_stage == 2 {
            auth_stage = 0;
            "235 2.7.0 Authentication successful".to_string()
        } else if upper.starts_with("EHLO") {
            let mut lines = vec!["250-stub.example.com".to_string()];
            if script.starttls && !tls_done {
                lines.push("250-STARTTLS".into());
            }
            lines.push("250-SIZE 35882577".into());
            lines.push("250 AUTH LOGIN PLAIN".into());
            lines.join("\r\n")
        } else if upper == "STARTTLS" {
            tls_done = true;
            "220 2.0.0 Ready to start TLS".to_string()
        } else if upper == "AUTH LOGIN" {
            auth_stage = 1;
            "334 VXNlcm5hbWU6".to_string()
        } else if upper.starts_with("MAIL FROM") || upper.starts_with("RCPT TO") {
            "250 2.1.0 Ok".to_string()
        } else if upper == "DATA" {
            reply(&mut reader, "354 End data with <CR><LF>.<CR><LF>").await;
            let body = read_data(&mut reader).await;
            {
                let mut seen = observed.lock().unwrap();
                seen.body = body;
                seen.transcript.push("<message>".into());
            }
            script.queued.clone()
        } else if upper == "QUIT" {
            reply(&mut reader, "221 2.0.0 Bye").await;
            return;
        } else {
            "502 5.5.2 Command not recognized".to_string()
        };

        reply(&mut reader, &answer).await;
    }
}

async fn read_data<S>(reader: &mut BufReader<S>) -> String
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut lines = Vec::new();
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
            break;
        }
        let text = line.trim_end_matches(['\r', '\n']);
        if text == "." {
            break;
        }
        lines.push(text.to_string());
    }
    lines.join("\n")
}

async fn reply<S>(reader: &mut BufReader<S>, text: &str)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let io = reader.get_mut();
    let _ = io.write_all(format!("{text}\r\n").as_bytes()).await;
    let _ = io.flush().await;
}

/// Connector that hands out in-memory pipes to a [`serve`] task.
///
/// The TLS handshake is a pass-through that only leaves a `<tls>` marker.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    pub script: Script,
    pub observed: Shared,
}

impl MockConnector {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            observed: Shared::default(),
        }
    }

    pub fn transcript(&self) -> Vec<String> {
        self.observed.lock().unwrap().transcript.clone()
    }

    pub fn body(&self) -> String {
        self.observed.lock().unwrap().body.clone()
    }

    pub fn connects(&self) -> usize {
        self.observed.lock().unwrap().connects
    }
}

impl Connector for MockConnector {
    async fn connect(&self, _host: &str, _port: u16) -> io::Result<BoxedIo> {
        let (client, server) = tokio::io::duplex(64 * 1024);
        self.observed.lock().unwrap().connects += 1;
        tokio::spawn(serve(server, self.script.clone(), Arc::clone(&self.observed)));
        Ok(Box::new(client))
    }

    async fn handshake(&self, io: BoxedIo, host: &str) -> Result<BoxedIo> {
        if host.is_empty() {
            return Err(Error::InvalidServerName(host.to_string()));
        }
        if self.script.tls_fails {
            return Err(Error::handshake(io::Error::new(
                io::ErrorKind::InvalidData,
                "invalid peer certificate: UnknownIssuer",
            )));
        }
        self.observed.lock().unwrap().transcript.push("<tls>".into());
        Ok(io)
    }
}
