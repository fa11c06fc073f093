//! Error types for the core library.

use crate::settings::{StoreError, ValidationError};
use thiserror::Error;

/// Why a single send did not go through.
#[derive(Debug, Error)]
pub enum SendError {
    /// Settings are disabled or incomplete. Nothing was sent over the network.
    #[error("SMTP configuration error: {}", join_messages(.0))]
    Config(Vec<ValidationError>),

    /// The message could not be built.
    #[error("Failed to build message: {0}")]
    Mime(#[from] sendwire_mime::Error),

    /// Address validation, connection, protocol, or transmission failure.
    #[error(transparent)]
    Smtp(#[from] sendwire_smtp::Error),
}

impl SendError {
    /// Returns true if this failed before any network I/O.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ValidationError::message)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failures of the dispatch workflow itself, as opposed to the send.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Settings could not be loaded.
    #[error("Failed to load SMTP settings: {0}")]
    Settings(#[from] StoreError),
}
