//! SMTP settings model.

use serde::{Deserialize, Serialize};
use sendwire_smtp::{Credentials, Security, TransportConfig};
use std::fmt;
use std::time::Duration;

/// Connection encryption as stored in settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encryption {
    /// Plain TCP for the whole session.
    None,
    /// Plain TCP upgraded with STARTTLS.
    #[default]
    Tls,
    /// TLS from the first byte.
    Ssl,
}

impl Encryption {
    /// Get display name for the encryption mode.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::None => "None (insecure)",
            Self::Tls => "STARTTLS",
            Self::Ssl => "SSL/TLS",
        }
    }
}

impl From<Encryption> for Security {
    fn from(encryption: Encryption) -> Self {
        match encryption {
            Encryption::None => Self::None,
            Encryption::Tls => Self::StartTls,
            Encryption::Ssl => Self::Implicit,
        }
    }
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

const fn default_io_timeout_secs() -> u64 {
    30
}

/// SMTP settings, shaped like the persisted settings row.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpSettings {
    /// Sending is administratively enabled.
    #[serde(default)]
    pub enabled: bool,
    /// Server hostname.
    #[serde(default)]
    pub host: String,
    /// Server port.
    #[serde(default)]
    pub port: u16,
    /// AUTH LOGIN username.
    #[serde(default)]
    pub username: String,
    /// AUTH LOGIN password.
    #[serde(default)]
    pub password: String,
    /// Sender address.
    #[serde(default)]
    pub from_email: String,
    /// Sender display name.
    #[serde(default)]
    pub from_name: String,
    /// Connection encryption.
    #[serde(default)]
    pub encryption: Encryption,
    /// Seconds allowed for connecting, TLS included.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Seconds allowed for each command/reply exchange.
    #[serde(default = "default_io_timeout_secs")]
    pub io_timeout_secs: u64,
    /// With `tls`, refuse to continue in plaintext when the server does not offer STARTTLS.
    #[serde(default)]
    pub require_tls: bool,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            host: String::new(),
            port: 0,
            username: String::new(),
            password: String::new(),
            from_email: String::new(),
            from_name: String::new(),
            encryption: Encryption::default(),
            connect_timeout_secs: default_connect_timeout_secs(),
            io_timeout_secs: default_io_timeout_secs(),
            require_tls: false,
        }
    }
}

impl SmtpSettings {
    /// Conventional port for an encryption mode.
    #[must_use]
    pub const fn default_port(encryption: Encryption) -> u16 {
        match encryption {
            Encryption::None => 25,
            Encryption::Tls => 587,
            Encryption::Ssl => 465,
        }
    }

    /// Builds the transport configuration for these settings.
    ///
    /// The EHLO name is the server host.
    #[must_use]
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::builder(self.host.trim())
            .port(self.port)
            .security(self.encryption.into())
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .io_timeout(Duration::from_secs(self.io_timeout_secs))
            .require_tls(self.require_tls)
            .build()
    }

    /// AUTH LOGIN credentials.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("enabled", &self.enabled)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from_email", &self.from_email)
            .field("from_name", &self.from_name)
            .field("encryption", &self.encryption)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("io_timeout_secs", &self.io_timeout_secs)
            .field("require_tls", &self.require_tls)
            .finish()
    }
}
