//! SMTP settings: model, validation and storage.

mod model;
mod store;
mod validation;

pub use model::{Encryption, SmtpSettings};
pub use store::{JsonSettingsFile, SettingsStore, StaticSettings, StoreError};
pub use validation::{ValidationError, ValidationResult, validate_settings};
