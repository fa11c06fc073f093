//! # sendwire
//!
//! HTTP front end for sending transactional email.
//!
//! One endpoint, `POST /send-email`, takes
//! `{"emailData": {"to", "subject", "body", "recipientName"}, "logId"}`,
//! loads the SMTP settings, sends a multipart/alternative message over a
//! fresh SMTP connection and records the outcome under `logId`.
//!
//! | Outcome | Status | Body |
//! |---|---|---|
//! | sent | 200 | `{"success": true, "message": "Email sent successfully", "messageId"}` |
//! | not sent | 400 | `{"success": false, "message": <error>}` |
//! | malformed body | 400 | `{"success": false, "message": "Invalid request body: .."}` |
//! | settings store failure | 500 | `{"success": false, "message": "Internal server error"}` |

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
