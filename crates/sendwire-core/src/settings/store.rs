//! Where settings come from.

use super::model::SmtpSettings;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Errors loading settings.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The settings could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The settings are not valid JSON of the expected shape.
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Source of SMTP settings, consulted once per send.
pub trait SettingsStore: Send + Sync {
    /// Loads the current settings.
    fn load(&self) -> impl Future<Output = Result<SmtpSettings, StoreError>> + Send;
}

/// Settings read from a JSON file on every load, so edits apply without a restart.
#[derive(Debug, Clone)]
pub struct JsonSettingsFile {
    path: PathBuf,
}

impl JsonSettingsFile {
    /// Creates a store for the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the settings file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsFile {
    async fn load(&self) -> Result<SmtpSettings, StoreError> {
        debug!(path = %self.path.display(), "Loading SMTP settings");

        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| StoreError::Read {
                path: self.path.clone(),
                source,
            })?;

        serde_json::from_str(&text).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

/// Fixed settings held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSettings(pub SmtpSettings);

impl SettingsStore for StaticSettings {
    async fn load(&self) -> Result<SmtpSettings, StoreError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::settings::Encryption;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sendwire-{}-{name}.json", std::process::id()))
    }

    #[tokio::test]
    async fn loads_json_file() {
        let path = temp_path("load");
        tokio::fs::write(
            &path,
            r#"{"enabled": true, "host": "smtp.example.com", "port": 587, "encryption": "tls"}"#,
        )
        .await
        .unwrap();

        let settings = JsonSettingsFile::new(&path).load().await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert!(settings.enabled);
        assert_eq!(settings.host, "smtp.example.com");
        assert_eq!(settings.encryption, Encryption::Tls);
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let err = JsonSettingsFile::new(temp_path("missing"))
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));
    }

    #[tokio::test]
    async fn malformed_file_is_a_parse_error() {
        let path = temp_path("malformed");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let err = JsonSettingsFile::new(&path).load().await.unwrap_err();
        tokio::fs::remove_file(&path).await.unwrap();

        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[tokio::test]
    async fn static_settings_return_a_copy() {
        let settings = SmtpSettings {
            host: "h".into(),
            ..SmtpSettings::default()
        };
        let store = StaticSettings(settings.clone());
        assert_eq!(store.load().await.unwrap(), settings);
    }
}
