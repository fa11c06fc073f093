//! # sendwire-core
//!
//! The send operation and the email-dispatch workflow around it.
//!
//! This crate provides:
//! - SMTP settings, their validation, and stores to load them from
//! - [`Mailer`]: one email per call, every failure mapped to a [`SendResult`]
//! - [`Dispatcher`]: load settings, send, and record the outcome in a
//!   [`DeliveryLog`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod dispatch;
mod error;
pub mod mailer;
pub mod settings;

pub use dispatch::{
    DeliveryLog, DeliveryStatus, Dispatcher, JsonlDeliveryLog, LogEntry, LogError,
    MemoryDeliveryLog,
};
pub use error::{DispatchError, SendError};
pub use mailer::{EmailRequest, Mailer, SendResult};
pub use settings::{
    Encryption, JsonSettingsFile, SettingsStore, SmtpSettings, StaticSettings, StoreError,
    ValidationError, ValidationResult, validate_settings,
};
