//! Transport configuration types.

use std::time::Duration;

/// Default time allowed for TCP connect plus any TLS handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default time allowed for each command/reply exchange.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection security mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Security {
    /// No encryption for the whole session. **Not recommended for production.**
    None,
    /// Start with plaintext, upgrade with STARTTLS when the server offers it.
    #[default]
    StartTls,
    /// TLS from the first byte (port 465).
    Implicit,
}

impl Security {
    /// Returns the conventional port for this security mode.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::None => 25,
            Self::StartTls => 587,
            Self::Implicit => 465,
        }
    }
}

/// SMTP transport configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Security mode.
    pub security: Security,
    /// Name sent with EHLO.
    pub client_name: String,
    /// Connection timeout (TCP connect plus TLS handshake).
    pub connect_timeout: Duration,
    /// Timeout for each write and each reply.
    pub io_timeout: Duration,
    /// Fail instead of continuing in plaintext when STARTTLS is not offered.
    pub require_tls: bool,
}

impl TransportConfig {
    /// Creates a configuration using STARTTLS on port 587.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self::builder(host).build()
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder(host: impl Into<String>) -> TransportConfigBuilder {
        TransportConfigBuilder::new(host)
    }
}

/// Builder for transport configuration.
#[derive(Debug, Clone)]
pub struct TransportConfigBuilder {
    host: String,
    port: Option<u16>,
    security: Security,
    client_name: Option<String>,
    connect_timeout: Duration,
    io_timeout: Duration,
    require_tls: bool,
}

impl TransportConfigBuilder {
    /// Creates a new builder with the given hostname.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            security: Security::default(),
            client_name: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            io_timeout: DEFAULT_IO_TIMEOUT,
            require_tls: false,
        }
    }

    /// Sets the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the security mode.
    #[must_use]
    pub const fn security(mut self, security: Security) -> Self {
        self.security = security;
        self
    }

    /// Sets the name announced with EHLO. Defaults to the server host.
    #[must_use]
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the per-step I/O timeout.
    #[must_use]
    pub const fn io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Refuses to authenticate over plaintext when a STARTTLS server does not
    /// offer STARTTLS. Off by default.
    #[must_use]
    pub const fn require_tls(mut self, require: bool) -> Self {
        self.require_tls = require;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> TransportConfig {
        TransportConfig {
            client_name: self.client_name.unwrap_or_else(|| self.host.clone()),
            port: self.port.unwrap_or_else(|| self.security.default_port()),
            host: self.host,
            security: self.security,
            connect_timeout: self.connect_timeout,
            io_timeout: self.io_timeout,
            require_tls: self.require_tls,
        }
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

    #[test]
    fn test_default_ports() {
        assert_eq!(Security::None.default_port(), 25);
        assert_eq!(Security::StartTls.default_port(), 587);
        assert_eq!(Security::Implicit.default_port(), 465);
    }

    #[test]
    fn test_config_new() {
        let config = TransportConfig::new("smtp.example.com");
        assert_eq!(config.host, "smtp.example.com");
        assert_eq!(config.port, 587);
        assert_eq!(config.security, Security::StartTls);
        assert_eq!(config.client_name, "smtp.example.com");
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(config.io_timeout, DEFAULT_IO_TIMEOUT);
        assert!(!config.require_tls);
    }

    #[test]
    fn test_config_builder() {
        let config = TransportConfig::builder("smtp.example.com")
            .port(2525)
            .security(Security::Implicit)
            .client_name("kb.example.org")
            .io_timeout(Duration::from_secs(5))
            .require_tls(true)
            .build();

        assert_eq!(config.port, 2525);
        assert!(config.require_tls);
        assert_eq!(config.security, Security::Implicit);
        assert_eq!(config.client_name, "kb.example.org");
        assert_eq!(config.io_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_config_builder_default_port() {
        let config = TransportConfig::builder("smtp.example.com")
            .security(Security::Implicit)
            .build();

        assert_eq!(config.port, 465);
    }
}
