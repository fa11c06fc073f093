//! Error types for SMTP operations.

use crate::types::Reply;
use std::io;
use std::time::Duration;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// TCP connect or TLS handshake failed before the dialogue started.
    #[error("SMTP connection failed: {0}")]
    Connect(#[source] io::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The host cannot be used as a TLS server name.
    #[error("Invalid TLS server name: {0}")]
    InvalidServerName(String),

    /// Server answered a step with an unexpected reply code.
    #[error("{step}: {reply}")]
    Rejected {
        /// Failure label of the step that was rejected.
        step: &'static str,
        /// The full server reply.
        reply: Reply,
    },

    /// No progress within the configured timeout.
    #[error("{during}: timed out after {}s", .after.as_secs_f32())]
    Timeout {
        /// What was being waited on.
        during: &'static str,
        /// The timeout that elapsed.
        after: Duration,
    },

    /// TLS is required but the server did not offer STARTTLS.
    #[error("STARTTLS failed: server does not advertise STARTTLS")]
    StartTlsUnavailable,

    /// The send was cancelled by the caller.
    #[error("SMTP send cancelled")]
    Cancelled,

    /// TLS handshake failed, either for implicit TLS or after STARTTLS.
    #[error("{during}: TLS handshake failed: {source}")]
    Handshake {
        /// Step the handshake belonged to.
        during: &'static str,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The server answered with a line that is not an SMTP reply line.
    #[error("{during}: {line}")]
    MalformedReply {
        /// Step whose reply was malformed.
        during: &'static str,
        /// The raw line.
        line: String,
    },

    /// Protocol error (malformed or unexpected server output).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// The connection broke while the message body was being transmitted.
    #[error("Message sending failed: {0}")]
    Transmission(#[source] io::Error),
}

impl Error {
    /// Creates a rejection error for the given step.
    #[must_use]
    pub const fn rejected(step: &'static str, reply: Reply) -> Self {
        Self::Rejected { step, reply }
    }

    /// A failed TLS handshake while connecting.
    #[must_use]
    pub const fn handshake(source: io::Error) -> Self {
        Self::Handshake {
            during: "SMTP connection failed",
            source,
        }
    }

    /// A reply line that is not `NNN`, `NNN text` or `NNN-text`.
    #[must_use]
    pub const fn malformed(line: String) -> Self {
        Self::MalformedReply {
            during: "Malformed server reply",
            line,
        }
    }

    /// Returns the server reply code if the server rejected a step.
    #[must_use]
    pub const fn reply_code(&self) -> Option<u16> {
        match self {
            Self::Rejected { reply, .. } => Some(reply.code.as_u16()),
            _ => None,
        }
    }

    /// Returns true if this is a permanent error (5xx).
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self, Self::Rejected { reply, .. } if reply.code.is_permanent())
    }

    /// Returns true if this is a transient error (4xx), a timeout, or a broken connection.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Rejected { reply, .. } => reply.code.is_transient(),
            Self::Timeout { .. } | Self::Connect(_) | Self::Io(_) | Self::Transmission(_) => true,
            _ => false,
        }
    }

    /// Attributes a timeout, handshake failure or malformed reply to the
    /// step that was running.
    pub(crate) fn during(self, step: &'static str) -> Self {
        match self {
            Self::Timeout { after, .. } => Self::Timeout {
                during: step,
                after,
            },
            Self::Handshake { source, .. } => Self::Handshake {
                during: step,
                source,
            },
            Self::MalformedReply { line, .. } => Self::MalformedReply {
                during: step,
                line,
            },
            other => other,
        }
    }
}
