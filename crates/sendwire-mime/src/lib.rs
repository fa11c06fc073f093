//! # sendwire-mime
//!
//! Builds the multipart/alternative messages sendwire submits over SMTP.
//!
//! ## Features
//!
//! - **Message generation**: one `text/plain` and one `text/html` alternative
//!   derived from a single body
//! - **Header safety**: CR/LF and other control characters never survive
//!   into a header value
//! - **Encoding**: RFC 2047 encoded-words for non-ASCII subjects and names
//! - **Unique identifiers**: boundaries and Message-IDs from a timestamp and
//!   a random token
//!
//! ## Quick Start
//!
//! ```ignore
//! use sendwire_mime::MessageBuilder;
//!
//! let message = MessageBuilder::new()
//!     .from("Support", "support@example.com")
//!     .to("Ada", "ada@example.com")
//!     .subject("Your report")
//!     .body("Hello Ada,\n<b>the report is ready</b>.")
//!     .message_id_host("smtp.example.com")
//!     .build()?;
//!
//! let bytes = message.to_bytes();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
mod header;
mod id;
mod message;

pub mod encoding;
pub mod html;

pub use error::{Error, Result};
pub use header::Headers;
pub use id::{generate_boundary, generate_message_id};
pub use message::{MAILER, Message, MessageBuilder};
