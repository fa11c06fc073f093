//! Delivery log: where the outcome of each dispatched email is recorded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

/// Errors updating the delivery log.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Final state of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Accepted by the server.
    Sent,
    /// Not delivered.
    Failed,
}

/// One log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Caller-supplied correlation id.
    pub log_id: String,
    /// Outcome.
    pub status: DeliveryStatus,
    /// When the outcome was recorded.
    pub at: DateTime<Utc>,
    /// Message-ID of a sent email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Error of a failed email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Records dispatch outcomes. Marking an id that has no record yet creates it.
pub trait DeliveryLog: Send + Sync {
    /// Marks `log_id` as sent at `at`.
    fn mark_sent(
        &self,
        log_id: &str,
        at: DateTime<Utc>,
        message_id: Option<&str>,
    ) -> impl Future<Output = Result<(), LogError>> + Send;

    /// Marks `log_id` as failed with `error`.
    fn mark_failed(&self, log_id: &str, error: &str)
    -> impl Future<Output = Result<(), LogError>> + Send;
}

/// In-memory log, newest state per id.
#[derive(Debug, Default)]
pub struct MemoryDeliveryLog {
    entries: RwLock<HashMap<String, LogEntry>>,
}

impl MemoryDeliveryLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `log_id`.
    pub async fn get(&self, log_id: &str) -> Option<LogEntry> {
        self.entries.read().await.get(log_id).cloned()
    }

    /// Returns the number of entries.
    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }

    async fn put(&self, entry: LogEntry) {
        self.entries
            .write()
            .await
            .insert(entry.log_id.clone(), entry);
    }
}

impl DeliveryLog for MemoryDeliveryLog {
    async fn mark_sent(
        &self,
        log_id: &str,
        at: DateTime<Utc>,
        message_id: Option<&str>,
    ) -> Result<(), LogError> {
        self.put(LogEntry {
            log_id: log_id.to_string(),
            status: DeliveryStatus::Sent,
            at,
            message_id: message_id.map(str::to_string),
            error: None,
        })
        .await;
        Ok(())
    }

    async fn mark_failed(&self, log_id: &str, error: &str) -> Result<(), LogError> {
        self.put(LogEntry {
            log_id: log_id.to_string(),
            status: DeliveryStatus::Failed,
            at: Utc::now(),
            message_id: None,
            error: Some(error.to_string()),
        })
        .await;
        Ok(())
    }
}

/// Append-only JSON Lines file; the last line for an id is its state.
#[derive(Debug, Clone)]
pub struct JsonlDeliveryLog {
    path: PathBuf,
}

impl JsonlDeliveryLog {
    /// Creates a log appending to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn append(&self, entry: &LogEntry) -> Result<(), LogError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

impl DeliveryLog for JsonlDeliveryLog {
    async fn mark_sent(
        &self,
        log_id: &str,
        at: DateTime<Utc>,
        message_id: Option<&str>,
    ) -> Result<(), LogError> {
        self.append(&LogEntry {
            log_id: log_id.to_string(),
            status: DeliveryStatus::Sent,
            at,
            message_id: message_id.map(str::to_string),
            error: None,
        })
        .await
    }

    async fn mark_failed(&self, log_id: &str, error: &str) -> Result<(), LogError> {
        self.append(&LogEntry {
            log_id: log_id.to_string(),
            status: DeliveryStatus::Failed,
            at: Utc::now(),
            message_id: None,
            error: Some(error.to_string()),
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_log_keeps_latest_state() {
        let log = MemoryDeliveryLog::new();
        log.mark_failed("42", "RCPT TO failed: 550 no").await.unwrap();
        assert_eq!(log.get("42").await.unwrap().status, DeliveryStatus::Failed);

        let at = Utc::now();
        log.mark_sent("42", at, Some("id@host")).await.unwrap();
        let entry = log.get("42").await.unwrap();
        assert_eq!(entry.status, DeliveryStatus::Sent);
        assert_eq!(entry.at, at);
        assert_eq!(entry.message_id.as_deref(), Some("id@host"));
        assert_eq!(entry.error, None);
        assert_eq!(log.count().await, 1);
    }

    #[tokio::test]
    async fn jsonl_log_appends_lines() {
        let path = std::env::temp_dir().join(format!("sendwire-{}-log.jsonl", std::process::id()));
        let _ = tokio::fs::remove_file(&path).await;

        let log = JsonlDeliveryLog::new(&path);
        log.mark_sent("a", Utc::now(), Some("m@host")).await.unwrap();
        log.mark_failed("b", "EHLO failed: 554 no").await.unwrap();

        let text = tokio::fs::read_to_string(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        let entries: Vec<LogEntry> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].log_id, "a");
        assert_eq!(entries[0].status, DeliveryStatus::Sent);
        assert_eq!(entries[1].error.as_deref(), Some("EHLO failed: 554 no"));
        assert!(text.contains("\"logId\":\"a\""));
    }
}
