//! Settings validation.

use super::model::SmtpSettings;

/// Validation error for SMTP settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Sending is switched off.
    Disabled,
    /// SMTP host is empty.
    EmptyHost,
    /// SMTP port is invalid.
    InvalidPort,
    /// SMTP username is empty.
    EmptyUsername,
    /// SMTP password is empty.
    EmptyPassword,
    /// Sender address is empty.
    EmptyFromEmail,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Disabled => "SMTP is not enabled",
            Self::EmptyHost => "SMTP server is required",
            Self::InvalidPort => "SMTP port must be 1-65535",
            Self::EmptyUsername => "SMTP username is required",
            Self::EmptyPassword => "SMTP password is required",
            Self::EmptyFromEmail => "Sender email address is required",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Disabled => "enabled",
            Self::EmptyHost => "host",
            Self::InvalidPort => "port",
            Self::EmptyUsername => "username",
            Self::EmptyPassword => "password",
            Self::EmptyFromEmail => "from_email",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating settings.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validate SMTP settings before any connection is attempted.
///
/// Disabled settings report only [`ValidationError::Disabled`]; otherwise
/// every problem is reported.
///
/// # Errors
///
/// Returns a vector of `ValidationError` if sending cannot proceed.
pub fn validate_settings(settings: &SmtpSettings) -> ValidationResult {
    if !settings.enabled {
        return Err(vec![ValidationError::Disabled]);
    }

    let mut errors = Vec::new();

    if settings.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }
    if settings.port == 0 {
        errors.push(ValidationError::InvalidPort);
    }
    if settings.username.trim().is_empty() {
        errors.push(ValidationError::EmptyUsername);
    }
    if settings.password.is_empty() {
        errors.push(ValidationError::EmptyPassword);
    }
    if settings.from_email.trim().is_empty() {
        errors.push(ValidationError::EmptyFromEmail);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    fn complete() -> SmtpSettings {
        SmtpSettings {
            enabled: true,
            host: "smtp.example.com".into(),
            port: 587,
            username: "u".into(),
            password: "p".into(),
            from_email: "a@example.com".into(),
            from_name: "A".into(),
            ..SmtpSettings::default()
        }
    }

    #[test]
    fn test_validate_complete_settings() {
        assert!(validate_settings(&complete()).is_ok());
    }

    #[test]
    fn test_from_name_is_optional() {
        let settings = SmtpSettings {
            from_name: String::new(),
            ..complete()
        };
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_disabled_short_circuits() {
        let settings = SmtpSettings {
            enabled: false,
            host: String::new(),
            ..complete()
        };
        assert_eq!(
            validate_settings(&settings).unwrap_err(),
            vec![ValidationError::Disabled]
        );
    }

    #[test]
    fn test_validate_empty_settings() {
        let settings = SmtpSettings {
            enabled: true,
            ..SmtpSettings::default()
        };
        let errors = validate_settings(&settings).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyHost,
                ValidationError::InvalidPort,
                ValidationError::EmptyUsername,
                ValidationError::EmptyPassword,
                ValidationError::EmptyFromEmail,
            ]
        );
    }

    #[test]
    fn test_whitespace_host_is_empty() {
        let settings = SmtpSettings {
            host: "   ".into(),
            ..complete()
        };
        assert_eq!(
            validate_settings(&settings).unwrap_err(),
            vec![ValidationError::EmptyHost]
        );
    }

    #[test]
    fn test_messages_and_fields() {
        assert_eq!(ValidationError::EmptyHost.to_string(), "SMTP server is required");
        assert_eq!(ValidationError::EmptyFromEmail.field(), "from_email");
    }
}
