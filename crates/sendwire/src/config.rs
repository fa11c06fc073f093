//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Default listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0:8025";

/// Errors reading the server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `SENDWIRE_BIND` is not a socket address.
    #[error("Invalid SENDWIRE_BIND '{value}': {source}")]
    InvalidBind {
        /// The rejected value.
        value: String,
        /// Parse error.
        source: std::net::AddrParseError,
    },
}

/// Where the server listens and where it keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address (`SENDWIRE_BIND`).
    pub bind: SocketAddr,
    /// SMTP settings JSON file (`SENDWIRE_SETTINGS`).
    pub settings_path: PathBuf,
    /// Delivery log, JSON Lines (`SENDWIRE_DELIVERY_LOG`).
    pub delivery_log_path: PathBuf,
}

impl ServerConfig {
    /// Reads the configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `SENDWIRE_BIND` is set but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`; empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if `SENDWIRE_BIND` is set but unparseable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let bind = get("SENDWIRE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidBind {
                value: bind.clone(),
                source,
            })?;

        let settings_path = get("SENDWIRE_SETTINGS").map_or_else(
            || app_dir(dirs::config_dir()).join("smtp.json"),
            PathBuf::from,
        );
        let delivery_log_path = get("SENDWIRE_DELIVERY_LOG").map_or_else(
            || app_dir(dirs::data_dir()).join("deliveries.jsonl"),
            PathBuf::from,
        );

        Ok(Self {
            bind,
            settings_path,
            delivery_log_path,
        })
    }
}

fn app_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join("sendwire")
}
