//! # sendwire-smtp
//!
//! A small SMTP submission client implementing the subset of RFC 5321 needed
//! to hand one message to a relay.
//!
//! ## Features
//!
//! - **Single-shot transport**: connect, authenticate, send one message, quit
//! - **TLS support**: implicit TLS (port 465) and STARTTLS via rustls
//! - **Authentication**: AUTH LOGIN
//! - **Timeouts and cancellation**: every step is bounded, and a
//!   [`CancellationToken`](tokio_util::sync::CancellationToken) aborts a send
//!
//! ## Quick Start
//!
//! ```ignore
//! use sendwire_smtp::{Address, Credentials, Envelope, Security, SmtpTransport, TransportConfig};
//!
//! #[tokio::main]
//! async fn main() -> sendwire_smtp::Result<()> {
//!     let config = TransportConfig::builder("smtp.example.com")
//!         .security(Security::StartTls)
//!         .build();
//!     let transport = SmtpTransport::new(config);
//!
//!     let credentials = Credentials::new("user@example.com", "password");
//!     let envelope = Envelope::new(
//!         Address::new("sender@example.com")?,
//!         Address::new("recipient@example.com")?,
//!     );
//!
//!     let message = b"Subject: Test\r\n\r\nHello, World!\r\n";
//!     let delivery = transport.send(&credentials, &envelope, message).await?;
//!     println!("accepted: {}", delivery.reply);
//!     Ok(())
//! }
//! ```
//!
//! ## Dialogue
//!
//! ```text
//! greeting 220 → EHLO 250 → [STARTTLS 220 → TLS → EHLO 250]
//!   → AUTH LOGIN 334 → user 334 → pass 235
//!   → MAIL FROM 250 → RCPT TO 250 → DATA 354 → body 250 → QUIT
//! ```
//!
//! ## Modules
//!
//! - [`command`]: SMTP command builders
//! - [`connection`]: Streams, connectors and the per-connection session
//! - [`parser`]: Reply parser
//! - [`transport`]: The step table and [`SmtpTransport`]
//! - [`types`]: Core SMTP types (addresses, extensions, replies)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod transport;
pub mod types;

pub use connection::{Connector, RustlsConnector, ServerInfo};
pub use error::{Error, Result};
pub use transport::{Credentials, Delivery, Envelope, Security, SmtpTransport, TransportConfig};
pub use types::{Address, AuthMechanism, Extension, Reply, ReplyCode};
